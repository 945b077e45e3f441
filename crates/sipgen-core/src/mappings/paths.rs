use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SipError};

/// Separator between multiple paths in a single mapping cell.
pub const PATH_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    SourceFile,
    AccessFile,
    AltText,
    AggregateTop,
    AggregateBottom,
}

impl MappingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingKind::SourceFile => "source_file",
            MappingKind::AccessFile => "access_file",
            MappingKind::AltText => "alt_text",
            MappingKind::AggregateTop => "aggregate_top",
            MappingKind::AggregateBottom => "aggregate_bottom",
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub legacy_id: String,
    pub paths: Vec<PathBuf>,
}

impl MappingEntry {
    pub fn primary_path(&self) -> &Path {
        // Entries are only stored with at least one path.
        &self.paths[0]
    }
}

#[derive(Debug, Deserialize)]
struct MappingRow {
    id: String,
    #[serde(default)]
    source_file: Option<String>,
}

/// Legacy id to filesystem path(s), as written by a mapping stage.
#[derive(Debug, Clone)]
pub struct PathMapping {
    entries: HashMap<String, MappingEntry>,
}

impl PathMapping {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn from_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<P>)>,
        P: Into<PathBuf>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(legacy_id, paths)| {
                let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
                if paths.is_empty() {
                    return None;
                }
                Some((
                    legacy_id.clone(),
                    MappingEntry { legacy_id, paths },
                ))
            })
            .collect();
        Self { entries }
    }

    /// Reads `id,matching_value,source_file[,potential_matches]`; only `id` and
    /// `source_file` are used. Rows with an empty `source_file` are unmapped and
    /// left out.
    pub fn load_csv(kind: MappingKind, path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|err| SipError::csv(path, err))?;
        let mut entries = HashMap::new();
        for row in reader.deserialize::<MappingRow>() {
            let row = row.map_err(|err| SipError::csv(path, err))?;
            let paths = split_paths(row.source_file.as_deref().unwrap_or(""));
            if paths.is_empty() {
                continue;
            }
            for candidate in &paths {
                if !candidate.is_absolute() {
                    return Err(SipError::invalid_row(
                        path,
                        format!(
                            "{}: {kind} path {} is not absolute",
                            row.id,
                            candidate.display()
                        ),
                    ));
                }
            }
            let legacy_id = row.id.trim().to_string();
            entries.insert(
                legacy_id.clone(),
                MappingEntry { legacy_id, paths },
            );
        }
        Ok(Self { entries })
    }

    /// Loads the mapping when a path is configured, otherwise returns an empty one.
    pub fn load_optional(kind: MappingKind, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_csv(kind, path),
            None => Ok(Self::empty()),
        }
    }

    pub fn get(&self, legacy_id: &str) -> Option<&MappingEntry> {
        self.entries.get(legacy_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn split_paths(cell: &str) -> Vec<PathBuf> {
    cell.split(PATH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_paths_ignores_blank_segments() {
        let paths = split_paths("/a/one.tif| /a/two.tif ||");
        assert_eq!(
            paths,
            vec![PathBuf::from("/a/one.tif"), PathBuf::from("/a/two.tif")]
        );
        assert!(split_paths("").is_empty());
    }
}
