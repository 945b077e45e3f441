use std::path::Path;

use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::sink::{CsvRecord, CsvSink, EncodedRows};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkReportRow {
    pub legacy_id: String,
    pub work_id: Uuid,
    pub child_count: usize,
    pub single_item: bool,
}

impl CsvRecord for WorkReportRow {
    const HEADER: &'static [&'static str] = &["legacy_id", "work_id", "child_count", "single_item"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReportRow {
    pub legacy_id: Option<String>,
    pub work_id: Uuid,
    pub file_id: Uuid,
    pub single_item: bool,
}

impl CsvRecord for FileReportRow {
    const HEADER: &'static [&'static str] = &["legacy_id", "work_id", "file_id", "single_item"];
}

/// Report rows for one deposit, flushed with the deposit.
#[derive(Debug, Default)]
pub struct ReportBuffer {
    works: Vec<WorkReportRow>,
    files: Vec<FileReportRow>,
}

impl ReportBuffer {
    pub fn add_work_row(
        &mut self,
        legacy_id: impl Into<String>,
        work_id: Uuid,
        child_count: usize,
        single_item: bool,
    ) {
        self.works.push(WorkReportRow {
            legacy_id: legacy_id.into(),
            work_id,
            child_count,
            single_item,
        });
    }

    pub fn add_file_row(
        &mut self,
        legacy_id: Option<String>,
        work_id: Uuid,
        file_id: Uuid,
        single_item: bool,
    ) {
        self.files.push(FileReportRow {
            legacy_id,
            work_id,
            file_id,
            single_item,
        });
    }

    pub fn work_rows(&self) -> &[WorkReportRow] {
        &self.works
    }

    pub fn file_rows(&self) -> &[FileReportRow] {
        &self.files
    }
}

/// Migration report consumed by post-migration verification. Works and files
/// go to separate CSVs in `dir`.
#[derive(Debug)]
pub struct MigrationReportService {
    works: CsvSink,
    files: CsvSink,
}

/// A deposit's report rows, serialized and ready to append.
#[derive(Debug, Default)]
pub struct EncodedReport {
    works: EncodedRows,
    files: EncodedRows,
}

impl MigrationReportService {
    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Self {
            works: CsvSink::open(&dir.join("report_works.csv"))?,
            files: CsvSink::open(&dir.join("report_files.csv"))?,
        })
    }

    pub fn works_path(&self) -> &Path {
        self.works.path()
    }

    pub fn files_path(&self) -> &Path {
        self.files.path()
    }

    pub fn encode(&self, buffer: &ReportBuffer) -> Result<EncodedReport> {
        Ok(EncodedReport {
            works: self.works.encode(buffer.work_rows())?,
            files: self.files.encode(buffer.file_rows())?,
        })
    }

    pub fn write(&self, report: &EncodedReport) -> Result<()> {
        self.works.write(&report.works)?;
        self.files.write(&report.files)
    }
}
