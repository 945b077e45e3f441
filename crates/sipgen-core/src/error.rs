use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Why a single legacy object could not be turned into a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    NoSourceFile,
    NoDescription,
    NoChildren,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoSourceFile => "no_source_file",
            SkipReason::NoDescription => "no_description",
            SkipReason::NoChildren => "no_children",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::NoSourceFile => "no source file mapped and no streaming metadata",
            SkipReason::NoDescription => "no description found",
            SkipReason::NoChildren => "no children could be generated",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Error)]
pub enum SipError {
    #[error("cannot transform object {legacy_id}: {reason}")]
    MissingDependency {
        legacy_id: String,
        reason: SkipReason,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid row in {}: {message}", path.display())]
    InvalidRow { path: PathBuf, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl SipError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SipError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn csv(path: impl AsRef<Path>, source: csv::Error) -> Self {
        SipError::Csv {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid_row(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        SipError::InvalidRow {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// True for the per-object failures that `force` converts into skips.
    pub fn is_skippable(&self) -> bool {
        matches!(self, SipError::MissingDependency { .. })
    }
}

pub type Result<T> = std::result::Result<T, SipError>;
