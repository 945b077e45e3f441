#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use sipgen_core::destinations::{DestinationEntry, DestinationRouter};
use sipgen_core::index::RecordIndex;
use sipgen_core::mappings::{
    AggregateMappings, AggregateSource, DescriptionService, PathMapping,
    PermissionService, StreamingEntry, StreamingMetadataService,
};
use sipgen_core::model::{IndexedRecord, PatronAccess, Permissions, StructuralType};
use sipgen_core::premis::PremisLogger;
use sipgen_core::{GenerationContext, RunOptions};
use tempfile::TempDir;

pub const DEST_ID: &str = "bdbd99af-36a5-4bab-9785-e3a802d3737e";
pub const USERNAME: &str = "migr_user";

pub fn created() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2005, 12, 8, 0, 0, 0).unwrap()
}

/// A migration project laid out in a temp directory, with in-memory mappings.
pub struct Project {
    pub dir: TempDir,
    pub force: bool,
    records: Vec<IndexedRecord>,
    source_files: Vec<(String, Vec<PathBuf>)>,
    access_files: Vec<(String, Vec<PathBuf>)>,
    alt_text: Vec<(String, Vec<PathBuf>)>,
    streaming: Vec<StreamingEntry>,
    top: Vec<(String, Vec<PathBuf>)>,
    bottom: Vec<(String, Vec<PathBuf>)>,
    permissions: HashMap<String, Permissions>,
    default_destination: DestinationEntry,
    custom_destinations: HashMap<String, DestinationEntry>,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        for sub in ["descriptions", "source", "access", "alt_text", "aggregates"] {
            fs::create_dir_all(dir.path().join(sub)).expect("create project dir");
        }
        Self {
            dir,
            force: false,
            records: Vec::new(),
            source_files: Vec::new(),
            access_files: Vec::new(),
            alt_text: Vec::new(),
            streaming: Vec::new(),
            top: Vec::new(),
            bottom: Vec::new(),
            permissions: HashMap::new(),
            default_destination: DestinationEntry::existing(DEST_ID),
            custom_destinations: HashMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn sips_dir(&self) -> PathBuf {
        self.path().join("sips")
    }

    fn write(&self, relative: &str, body: &str) -> PathBuf {
        let path = self.path().join(relative);
        fs::write(&path, body).expect("write fixture file");
        path
    }

    pub fn record(&mut self, id: &str, parent: Option<&str>, kind: StructuralType) -> &mut Self {
        self.records.push(IndexedRecord::new(
            id,
            parent.map(str::to_string),
            created(),
            kind,
        ));
        self
    }

    pub fn describe(&mut self, id: &str) -> &mut Self {
        self.write(
            &format!("descriptions/{id}.xml"),
            &format!("<mods><titleInfo><title>Object {id}</title></titleInfo></mods>"),
        );
        self
    }

    pub fn source(&mut self, id: &str) -> &mut Self {
        let path = self.write(&format!("source/{id}.tif"), "tiff bytes");
        self.source_files.push((id.to_string(), vec![path]));
        self
    }

    pub fn access(&mut self, id: &str) -> &mut Self {
        let path = self.write(&format!("access/{id}.jpg"), "jpeg bytes");
        self.access_files.push((id.to_string(), vec![path]));
        self
    }

    pub fn alt_text(&mut self, id: &str) -> &mut Self {
        let path = self.write(&format!("alt_text/{id}.txt"), "A photograph");
        self.alt_text.push((id.to_string(), vec![path]));
        self
    }

    pub fn streaming(&mut self, id: &str, filename: &str) -> &mut Self {
        self.streaming.push(StreamingEntry {
            id: id.to_string(),
            streaming_file: filename.to_string(),
            streaming_space: "open-hls".to_string(),
        });
        self
    }

    pub fn aggregate_top(&mut self, key: &str) -> &mut Self {
        let path = self.write(&format!("aggregates/{key}_top.pdf"), "pdf bytes");
        self.top.push((key.to_string(), vec![path]));
        self
    }

    pub fn aggregate_bottom(&mut self, key: &str) -> &mut Self {
        let path = self.write(&format!("aggregates/{key}_bottom.pdf"), "pdf bytes");
        self.bottom.push((key.to_string(), vec![path]));
        self
    }

    pub fn permission(&mut self, id: &str, everyone: PatronAccess) -> &mut Self {
        self.permissions.insert(
            id.to_string(),
            Permissions {
                everyone,
                authenticated: PatronAccess::CanViewOriginals,
            },
        );
        self
    }

    pub fn destination(&mut self, id: &str, entry: DestinationEntry) -> &mut Self {
        self.custom_destinations.insert(id.to_string(), entry);
        self
    }

    /// Simple record with a description and a mapped source file.
    pub fn simple(&mut self, id: &str) -> &mut Self {
        self.record(id, None, StructuralType::Simple)
            .describe(id)
            .source(id)
    }

    /// Compound object with described parent and source-mapped children.
    pub fn compound(&mut self, id: &str, children: &[&str]) -> &mut Self {
        self.record(id, None, StructuralType::CompoundParent)
            .describe(id);
        for child in children {
            self.record(child, Some(id), StructuralType::CompoundChild)
                .source(child);
        }
        self
    }

    pub fn context(&self) -> GenerationContext {
        self.context_with_aggregates(AggregateSource::preloaded(AggregateMappings {
            top: PathMapping::from_entries(self.top.clone()),
            bottom: PathMapping::from_entries(self.bottom.clone()),
        }))
    }

    pub fn context_with_aggregates(&self, aggregates: AggregateSource) -> GenerationContext {
        GenerationContext {
            options: RunOptions::new(USERNAME, self.force),
            index: RecordIndex::from_records(self.records.clone()),
            destinations: DestinationRouter::new(
                Some(self.default_destination.clone()),
                self.custom_destinations.clone(),
            )
            .expect("router"),
            source_files: PathMapping::from_entries(self.source_files.clone()),
            access_files: PathMapping::from_entries(self.access_files.clone()),
            alt_text: PathMapping::from_entries(self.alt_text.clone()),
            permissions: PermissionService::new(
                Some(Permissions {
                    everyone: PatronAccess::CanViewMetadata,
                    authenticated: PatronAccess::CanViewOriginals,
                }),
                self.permissions.clone(),
            ),
            streaming: StreamingMetadataService::new(
                "https://durastream.lib.unc.edu/player",
                self.streaming.clone(),
            ),
            descriptions: DescriptionService::new(self.path().join("descriptions")),
            aggregates,
            premis: PremisLogger::new("sipgen test", USERNAME),
        }
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()))
        .lines()
        .map(str::to_string)
        .collect()
}
