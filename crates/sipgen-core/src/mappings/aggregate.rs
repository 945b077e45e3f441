use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{Result, SipError};
use crate::mappings::paths::{MappingEntry, MappingKind, PathMapping};

/// Wrapper files placed before ("top") or after ("bottom") a work's children.
#[derive(Debug, Clone)]
pub struct AggregateMappings {
    pub top: PathMapping,
    pub bottom: PathMapping,
}

impl AggregateMappings {
    pub fn top_for(&self, group_key: &str) -> Option<&MappingEntry> {
        self.top.get(group_key)
    }

    pub fn bottom_for(&self, group_key: &str) -> Option<&MappingEntry> {
        self.bottom.get(group_key)
    }
}

/// Loads the aggregate mappings on first use. Collections without compound or
/// grouped objects never touch these files.
#[derive(Debug)]
pub struct AggregateSource {
    top_path: Option<PathBuf>,
    bottom_path: Option<PathBuf>,
    loaded: OnceCell<AggregateMappings>,
}

impl AggregateSource {
    pub fn from_paths(top_path: Option<PathBuf>, bottom_path: Option<PathBuf>) -> Self {
        Self {
            top_path,
            bottom_path,
            loaded: OnceCell::new(),
        }
    }

    pub fn preloaded(mappings: AggregateMappings) -> Self {
        Self {
            top_path: None,
            bottom_path: None,
            loaded: OnceCell::with_value(mappings),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    pub fn get(&self) -> Result<&AggregateMappings> {
        self.loaded.get_or_try_init(|| {
            debug!(
                top = ?self.top_path,
                bottom = ?self.bottom_path,
                "loading aggregate file mappings"
            );
            Ok::<_, SipError>(AggregateMappings {
                top: PathMapping::load_optional(
                    MappingKind::AggregateTop,
                    self.top_path.as_deref(),
                )?,
                bottom: PathMapping::load_optional(
                    MappingKind::AggregateBottom,
                    self.bottom_path.as_deref(),
                )?,
            })
        })
    }
}
