use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Result, SipError};

/// Row id that holds the default destination.
pub const DEFAULT_ID: &str = "default";

/// Where a legacy object's work is placed in the target repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DestinationEntry {
    /// Existing repository container the deposit is submitted into.
    pub dest_id: String,
    /// Label of a collection to create inside `dest_id`, if any.
    pub new_collection: Option<String>,
}

impl DestinationEntry {
    pub fn existing(dest_id: impl Into<String>) -> Self {
        Self {
            dest_id: dest_id.into(),
            new_collection: None,
        }
    }

    pub fn new_collection(dest_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            dest_id: dest_id.into(),
            new_collection: Some(label.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DestinationRow {
    id: String,
    dest: String,
    #[serde(default)]
    new_collection: Option<String>,
}

#[derive(Debug)]
pub struct DestinationRouter {
    default: DestinationEntry,
    custom: HashMap<String, DestinationEntry>,
    collection_ids: HashMap<String, OnceCell<Uuid>>,
}

impl DestinationRouter {
    pub fn new(
        default: Option<DestinationEntry>,
        custom: HashMap<String, DestinationEntry>,
    ) -> Result<Self> {
        let default = default.ok_or_else(|| {
            SipError::Configuration("no default destination is configured".to_string())
        })?;
        let collection_ids = std::iter::once(&default)
            .chain(custom.values())
            .filter_map(|entry| entry.new_collection.clone())
            .map(|label| (label, OnceCell::new()))
            .collect();
        Ok(Self {
            default,
            custom,
            collection_ids,
        })
    }

    /// Loads `id,dest,new_collection`; the `default` row is required.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|err| SipError::csv(path, err))?;
        let mut default = None;
        let mut custom = HashMap::new();
        for row in reader.deserialize::<DestinationRow>() {
            let row = row.map_err(|err| SipError::csv(path, err))?;
            let entry = DestinationEntry {
                dest_id: row.dest.trim().to_string(),
                new_collection: row
                    .new_collection
                    .map(|label| label.trim().to_string())
                    .filter(|label| !label.is_empty()),
            };
            let id = row.id.trim();
            if id == DEFAULT_ID {
                default = Some(entry);
            } else {
                custom.insert(id.to_string(), entry);
            }
        }
        Self::new(default, custom).map_err(|_| {
            SipError::Configuration(format!(
                "destination mapping {} has no '{DEFAULT_ID}' row",
                path.display()
            ))
        })
    }

    pub fn resolve(&self, legacy_id: &str) -> &DestinationEntry {
        self.custom.get(legacy_id).unwrap_or(&self.default)
    }

    /// Id for the collection labelled `label`, minted on first request.
    pub fn new_collection_id(&self, label: &str) -> Option<Uuid> {
        self.collection_ids
            .get(label)
            .map(|cell| *cell.get_or_init(Uuid::new_v4))
    }
}
