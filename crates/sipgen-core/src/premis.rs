use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, SipError};

pub const MIGRATION_EVENT_TYPE: &str = "migration";
pub const MIGRATION_DETAIL: &str =
    "Object migrated from the legacy digital collections platform as part of SIP generation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Work,
    File,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventAgent {
    pub role: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PremisEvent {
    pub event_id: Uuid,
    pub event_type: &'static str,
    pub event_datetime: String,
    pub event_detail: &'static str,
    pub object_id: Uuid,
    pub object_kind: NodeKind,
    pub agents: Vec<EventAgent>,
}

/// Appends migration events to per-node PREMIS logs.
#[derive(Debug, Clone)]
pub struct PremisLogger {
    software_agent: String,
    authorizing_user: String,
}

impl PremisLogger {
    pub fn new(software_agent: impl Into<String>, authorizing_user: impl Into<String>) -> Self {
        Self {
            software_agent: software_agent.into(),
            authorizing_user: authorizing_user.into(),
        }
    }

    pub fn log_path(premis_dir: &Path, node_id: Uuid) -> PathBuf {
        premis_dir.join(format!("{node_id}.jsonl"))
    }

    pub fn log_migration(&self, premis_dir: &Path, node_id: Uuid, kind: NodeKind) -> Result<()> {
        self.log_migration_at(premis_dir, node_id, kind, Utc::now())
    }

    pub fn log_migration_at(
        &self,
        premis_dir: &Path,
        node_id: Uuid,
        kind: NodeKind,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let event = PremisEvent {
            event_id: Uuid::new_v4(),
            event_type: MIGRATION_EVENT_TYPE,
            event_datetime: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            event_detail: MIGRATION_DETAIL,
            object_id: node_id,
            object_kind: kind,
            agents: vec![
                EventAgent {
                    role: "executing_program",
                    name: self.software_agent.clone(),
                },
                EventAgent {
                    role: "authorizor",
                    name: self.authorizing_user.clone(),
                },
            ],
        };
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');

        let path = Self::log_path(premis_dir, node_id);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| SipError::io(&path, err))?;
        file.write_all(&line).map_err(|err| SipError::io(&path, err))
    }
}
