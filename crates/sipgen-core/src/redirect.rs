use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::sink::{CsvRecord, CsvSink, EncodedRows};

/// Suffix appended to a simple object's legacy id for its file row.
pub const ORIGINAL_FILE_SUFFIX: &str = "/original_file";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectRow {
    #[serde(rename = "cdm_id")]
    pub legacy_id: String,
    #[serde(rename = "box_c_work_id")]
    pub work_id: Uuid,
    #[serde(rename = "box_c_file_id")]
    pub file_id: Option<Uuid>,
}

impl CsvRecord for RedirectRow {
    const HEADER: &'static [&'static str] = &["cdm_id", "box_c_work_id", "box_c_file_id"];
}

/// Rows collected while one deposit graph is built. Nothing reaches the
/// shared table until the graph commits.
#[derive(Debug, Default)]
pub struct RedirectBuffer {
    rows: Vec<RedirectRow>,
}

impl RedirectBuffer {
    pub fn add_row(&mut self, legacy_id: impl Into<String>, work_id: Uuid, file_id: Option<Uuid>) {
        self.rows.push(RedirectRow {
            legacy_id: legacy_id.into(),
            work_id,
            file_id,
        });
    }

    pub fn rows(&self) -> &[RedirectRow] {
        &self.rows
    }
}

/// Append-only redirect table shared by every deposit in a run.
#[derive(Debug)]
pub struct RedirectMappingService {
    sink: CsvSink,
}

impl RedirectMappingService {
    /// Opens `path` for appending, writing the header only for a new file.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            sink: CsvSink::open(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        self.sink.path()
    }

    pub fn encode(&self, rows: &[RedirectRow]) -> Result<EncodedRows> {
        self.sink.encode(rows)
    }

    pub fn write(&self, rows: &EncodedRows) -> Result<()> {
        self.sink.write(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_serialized_fields() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .serialize(RedirectRow {
                legacy_id: "25".to_string(),
                work_id: Uuid::nil(),
                file_id: None,
            })
            .expect("serialize");
        let text = String::from_utf8(writer.into_inner().expect("flush")).expect("utf8");
        assert_eq!(
            text.lines().next(),
            Some(RedirectRow::HEADER.join(",").as_str())
        );
    }
}
