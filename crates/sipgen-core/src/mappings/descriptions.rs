use std::path::{Path, PathBuf};

/// Locates the expanded description document exported for each legacy object.
#[derive(Debug, Clone)]
pub struct DescriptionService {
    dir: PathBuf,
}

impl DescriptionService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn expected_path(&self, legacy_id: &str) -> PathBuf {
        self.dir.join(format!("{legacy_id}.xml"))
    }

    /// Path to the description for `legacy_id`, if one was exported.
    pub fn description_path(&self, legacy_id: &str) -> Option<PathBuf> {
        let path = self.expected_path(legacy_id);
        path.is_file().then_some(path)
    }
}
