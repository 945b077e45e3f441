//! Append-only CSV files shared by every deposit in a run.
//!
//! Rows are encoded in memory with [`CsvSink::encode`] and appended later
//! with [`CsvSink::write`], so a deposit can encode everything it will
//! publish before any shared file is touched.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use crate::error::{Result, SipError};

/// A row type with a fixed header line.
pub trait CsvRecord: Serialize {
    const HEADER: &'static [&'static str];
}

/// Serialized rows that have not been written anywhere yet.
#[derive(Debug, Default)]
pub struct EncodedRows {
    header: Vec<u8>,
    body: Vec<u8>,
}

impl EncodedRows {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(Debug)]
struct SinkFile {
    file: File,
    needs_header: bool,
}

#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    file: Mutex<SinkFile>,
}

impl CsvSink {
    /// Opens `path` for appending. The header is written with the first rows
    /// appended to an empty file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| SipError::io(parent, err))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| SipError::io(path, err))?;
        let needs_header = file.metadata().map_err(|err| SipError::io(path, err))?.len() == 0;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(SinkFile { file, needs_header }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encode<T: CsvRecord>(&self, rows: &[T]) -> Result<EncodedRows> {
        if rows.is_empty() {
            return Ok(EncodedRows::default());
        }
        let header = self.encode_with(|writer| writer.write_record(T::HEADER))?;
        let body =
            self.encode_with(|writer| rows.iter().try_for_each(|row| writer.serialize(row)))?;
        Ok(EncodedRows { header, body })
    }

    fn encode_with<F>(&self, fill: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&mut csv::Writer<Vec<u8>>) -> csv::Result<()>,
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        fill(&mut writer).map_err(|err| SipError::csv(&self.path, err))?;
        writer
            .into_inner()
            .map_err(|err| SipError::io(&self.path, err.into_error()))
    }

    /// Appends `rows` in a single write, preceded by the header when the file
    /// has none yet.
    pub fn write(&self, rows: &EncodedRows) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut guard = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let sink = &mut *guard;

        let mut bytes = Vec::with_capacity(rows.header.len() + rows.body.len());
        if sink.needs_header {
            bytes.extend_from_slice(&rows.header);
        }
        bytes.extend_from_slice(&rows.body);
        sink.file
            .write_all(&bytes)
            .and_then(|()| sink.file.flush())
            .map_err(|err| SipError::io(&self.path, err))?;
        sink.needs_header = false;
        Ok(())
    }
}
