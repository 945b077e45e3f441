use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SipError};
use crate::model::{PatronAccess, Permissions};

/// Row id that holds the fallback permissions.
pub const DEFAULT_ID: &str = "default";

#[derive(Debug, Deserialize)]
struct PermissionRow {
    id: String,
    everyone: String,
    authenticated: String,
}

#[derive(Debug, Clone, Default)]
pub struct PermissionService {
    default: Option<Permissions>,
    entries: HashMap<String, Permissions>,
}

impl PermissionService {
    pub fn new(default: Option<Permissions>, entries: HashMap<String, Permissions>) -> Self {
        Self { default, entries }
    }

    pub fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|err| SipError::csv(path, err))?;
        let mut service = Self::default();
        for row in reader.deserialize::<PermissionRow>() {
            let row = row.map_err(|err| SipError::csv(path, err))?;
            let permissions = Permissions {
                everyone: parse_role(path, &row.id, &row.everyone)?,
                authenticated: parse_role(path, &row.id, &row.authenticated)?,
            };
            let id = row.id.trim();
            if id == DEFAULT_ID {
                service.default = Some(permissions);
            } else {
                service.entries.insert(id.to_string(), permissions);
            }
        }
        Ok(service)
    }

    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_csv(path),
            None => Ok(Self::default()),
        }
    }

    /// Permissions for `legacy_id`, falling back to the default row.
    pub fn resolve(&self, legacy_id: &str) -> Option<Permissions> {
        self.entries.get(legacy_id).copied().or(self.default)
    }
}

fn parse_role(path: &Path, id: &str, value: &str) -> Result<PatronAccess> {
    PatronAccess::try_from(value)
        .map_err(|message| SipError::invalid_row(path, format!("{id}: {message}")))
}
