use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SipError};
use crate::mappings::streaming::DEFAULT_STREAMING_BASE_URL;

pub const CONFIG_FILE_NAME: &str = "sipgen.toml";

fn default_streaming_base_url() -> String {
    DEFAULT_STREAMING_BASE_URL.to_string()
}

fn default_software_agent() -> String {
    format!("sipgen {}", env!("CARGO_PKG_VERSION"))
}

/// Locations of every input and output of a migration project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub project_name: String,
    pub index: PathBuf,
    pub destinations: PathBuf,
    pub source_files: PathBuf,
    #[serde(default)]
    pub access_files: Option<PathBuf>,
    #[serde(default)]
    pub alt_text: Option<PathBuf>,
    #[serde(default)]
    pub permissions: Option<PathBuf>,
    #[serde(default)]
    pub streaming_metadata: Option<PathBuf>,
    #[serde(default)]
    pub aggregate_top: Option<PathBuf>,
    #[serde(default)]
    pub aggregate_bottom: Option<PathBuf>,
    pub descriptions_dir: PathBuf,
    pub sips_dir: PathBuf,
    pub redirect_mapping: PathBuf,
    pub report_dir: PathBuf,
    #[serde(default = "default_streaming_base_url")]
    pub streaming_base_url: String,
    #[serde(default = "default_software_agent")]
    pub software_agent: String,
    /// Upper bound on destinations generated concurrently.
    #[serde(default)]
    pub max_parallel_destinations: Option<NonZeroUsize>,
}

impl ProjectConfig {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| SipError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the config and resolves relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| SipError::io(path, err))?;
        let mut config = Self::from_toml_str(&content, path)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.index);
        resolve(&mut self.destinations);
        resolve(&mut self.source_files);
        resolve(&mut self.descriptions_dir);
        resolve(&mut self.sips_dir);
        resolve(&mut self.redirect_mapping);
        resolve(&mut self.report_dir);
        for optional in [
            &mut self.access_files,
            &mut self.alt_text,
            &mut self.permissions,
            &mut self.streaming_metadata,
            &mut self.aggregate_top,
            &mut self.aggregate_bottom,
        ] {
            if let Some(p) = optional.as_mut() {
                resolve(p);
            }
        }
    }
}

/// Per-run options shared read-only by every generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// User authorizing the migration, cited in provenance events.
    pub username: String,
    /// Skip objects with missing dependencies instead of aborting.
    pub force: bool,
    /// Destinations generated at once; `None` uses the available parallelism.
    pub max_parallel: Option<NonZeroUsize>,
}

impl RunOptions {
    pub fn new(username: impl Into<String>, force: bool) -> Self {
        Self {
            username: username.into(),
            force,
            max_parallel: None,
        }
    }

    pub fn with_max_parallel(mut self, max_parallel: Option<NonZeroUsize>) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(SipError::Configuration(
                "run options must name the authorizing user".to_string(),
            ));
        }
        Ok(())
    }
}
