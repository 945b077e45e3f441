use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Result, SipError};
use crate::model::{compare_legacy_ids, parse_created, IndexedRecord, StructuralType};

#[derive(Debug, Deserialize)]
struct IndexRow {
    id: String,
    #[serde(default)]
    parent_id: Option<String>,
    created: String,
    #[serde(default)]
    structural_type: Option<String>,
}

/// Read-only snapshot of the indexed legacy records.
#[derive(Debug, Default)]
pub struct RecordIndex {
    records: Vec<IndexedRecord>,
    positions: HashMap<String, usize>,
    children: HashMap<String, Vec<usize>>,
}

impl RecordIndex {
    pub fn from_records(records: Vec<IndexedRecord>) -> Self {
        let mut positions = HashMap::with_capacity(records.len());
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, record) in records.iter().enumerate() {
            positions.entry(record.legacy_id.clone()).or_insert(position);
            if let Some(parent) = &record.parent_id {
                children.entry(parent.clone()).or_default().push(position);
            }
        }
        let index = Self {
            records,
            positions,
            children,
        };
        for orphan in index.orphans() {
            warn!(
                legacy_id = %orphan.legacy_id,
                parent_id = orphan.parent_id.as_deref().unwrap_or_default(),
                "parent is not in the index; record will not be generated"
            );
        }
        index
    }

    /// Loads an index export with columns `id,parent_id,created,structural_type`.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|err| SipError::csv(path, err))?;
        let mut records = Vec::new();
        for row in reader.deserialize::<IndexRow>() {
            let row = row.map_err(|err| SipError::csv(path, err))?;
            let created = parse_created(&row.created)
                .map_err(|message| SipError::invalid_row(path, format!("{}: {message}", row.id)))?;
            let structural_type =
                StructuralType::try_from(row.structural_type.as_deref().unwrap_or(""))
                    .map_err(|message| {
                        SipError::invalid_row(path, format!("{}: {message}", row.id))
                    })?;
            let parent_id = row
                .parent_id
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            records.push(IndexedRecord::new(
                row.id.trim(),
                parent_id,
                created,
                structural_type,
            ));
        }
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, legacy_id: &str) -> Option<&IndexedRecord> {
        self.positions
            .get(legacy_id)
            .map(|&position| &self.records[position])
    }

    /// Records whose parent id names no indexed record.
    pub fn orphans(&self) -> Vec<&IndexedRecord> {
        self.records
            .iter()
            .filter(|r| {
                r.parent_id
                    .as_deref()
                    .is_some_and(|parent| !self.positions.contains_key(parent))
            })
            .collect()
    }

    /// Records that become works, in legacy-ID order.
    pub fn top_level(&self) -> Vec<&IndexedRecord> {
        let mut top: Vec<&IndexedRecord> = self
            .records
            .iter()
            .filter(|r| r.parent_id.is_none() && r.structural_type != StructuralType::CompoundChild)
            .collect();
        top.sort_by(|a, b| compare_legacy_ids(&a.legacy_id, &b.legacy_id));
        top
    }

    /// Children of `parent_id` in insertion order.
    pub fn children_of(&self, parent_id: &str) -> Vec<&IndexedRecord> {
        self.children
            .get(parent_id)
            .map(|positions| positions.iter().map(|&p| &self.records[p]).collect())
            .unwrap_or_default()
    }
}
