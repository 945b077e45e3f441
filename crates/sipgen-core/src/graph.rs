use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::{Result, SipError};
use crate::mappings::StreamingReference;
use crate::model::Permissions;

pub const MEMBER_ORDER_SEPARATOR: char = '|';

/// Ordered child file ids of a work, stored as one `|`-joined property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOrder(Vec<Uuid>);

impl MemberOrder {
    pub fn new(ids: Vec<Uuid>) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn serialized(&self) -> String {
        self.0
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(&MEMBER_ORDER_SEPARATOR.to_string())
    }
}

impl Serialize for MemberOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.serialized())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginalDatastream {
    pub path: PathBuf,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessSurrogate {
    pub path: PathBuf,
    pub mime_type: String,
}

/// The content a file node points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileContent {
    Original(OriginalDatastream),
    Streaming(StreamingReference),
}

#[derive(Debug, Clone, Serialize)]
pub struct FileNode {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    pub content: FileContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_surrogate: Option<AccessSurrogate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

impl FileNode {
    pub fn original(&self) -> Option<&OriginalDatastream> {
        match &self.content {
            FileContent::Original(original) => Some(original),
            FileContent::Streaming(_) => None,
        }
    }

    pub fn streaming(&self) -> Option<&StreamingReference> {
        match &self.content {
            FileContent::Streaming(reference) => Some(reference),
            FileContent::Original(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkNode {
    pub id: Uuid,
    pub legacy_id: String,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_order: Option<MemberOrder>,
    pub files: Vec<FileNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionNode {
    pub id: Uuid,
    pub label: String,
    pub works: Vec<WorkNode>,
}

/// Everything deposited into one destination container.
#[derive(Debug, Clone, Serialize)]
pub struct DepositGraph {
    pub deposit_id: Uuid,
    pub dest_id: String,
    pub works: Vec<WorkNode>,
    pub collections: Vec<CollectionNode>,
}

impl DepositGraph {
    pub fn new(deposit_id: Uuid, dest_id: impl Into<String>) -> Self {
        Self {
            deposit_id,
            dest_id: dest_id.into(),
            works: Vec::new(),
            collections: Vec::new(),
        }
    }

    /// Adds `work` directly under the destination, or under the new
    /// collection `(collection_id, label)` when one is given.
    pub fn add_work(&mut self, work: WorkNode, collection: Option<(Uuid, &str)>) {
        let Some((collection_id, label)) = collection else {
            self.works.push(work);
            return;
        };
        match self.collections.iter_mut().find(|c| c.id == collection_id) {
            Some(existing) => existing.works.push(work),
            None => self.collections.push(CollectionNode {
                id: collection_id,
                label: label.to_string(),
                works: vec![work],
            }),
        }
    }

    pub fn all_works(&self) -> impl Iterator<Item = &WorkNode> {
        self.works
            .iter()
            .chain(self.collections.iter().flat_map(|c| c.works.iter()))
    }

    pub fn work_count(&self) -> usize {
        self.all_works().count()
    }

    pub fn find_work(&self, legacy_id: &str) -> Option<&WorkNode> {
        self.all_works().find(|w| w.legacy_id == legacy_id)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, body).map_err(|err| SipError::io(path, err))
    }
}
