use std::path::{Path, PathBuf};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, SipError};
use crate::graph::DepositGraph;
use crate::redirect::{RedirectBuffer, RedirectMappingService};
use crate::report::{MigrationReportService, ReportBuffer};

pub const MODEL_FILE_NAME: &str = "model.json";
pub const DESCRIPTION_DIR: &str = "description";
pub const PREMIS_DIR: &str = "premis";
pub const ALT_TEXT_DIR: &str = "alt_text";

/// A SIP under construction: the graph for one destination container, its
/// directory on disk, and the redirect/report rows it will publish.
#[derive(Debug)]
pub struct DepositBuilder {
    sip_dir: PathBuf,
    graph: DepositGraph,
    pub redirects: RedirectBuffer,
    pub report: ReportBuffer,
}

/// What a committed deposit left behind.
#[derive(Debug, Clone)]
pub struct CommittedDeposit {
    pub deposit_id: Uuid,
    pub dest_id: String,
    pub sip_dir: PathBuf,
    pub work_count: usize,
    pub file_count: usize,
}

impl DepositBuilder {
    /// Creates `<sips_dir>/<deposit-id>/` and its attachment directories.
    pub fn create(sips_dir: &Path, dest_id: &str) -> Result<Self> {
        let deposit_id = Uuid::new_v4();
        let sip_dir = sips_dir.join(deposit_id.to_string());
        for sub in [DESCRIPTION_DIR, PREMIS_DIR, ALT_TEXT_DIR] {
            let dir = sip_dir.join(sub);
            std::fs::create_dir_all(&dir).map_err(|err| SipError::io(&dir, err))?;
        }
        Ok(Self {
            sip_dir,
            graph: DepositGraph::new(deposit_id, dest_id),
            redirects: RedirectBuffer::default(),
            report: ReportBuffer::default(),
        })
    }

    pub fn deposit_id(&self) -> Uuid {
        self.graph.deposit_id
    }

    pub fn sip_dir(&self) -> &Path {
        &self.sip_dir
    }

    pub fn premis_dir(&self) -> PathBuf {
        self.sip_dir.join(PREMIS_DIR)
    }

    pub fn graph(&self) -> &DepositGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut DepositGraph {
        &mut self.graph
    }

    /// Copies a description document into the SIP as `description/<node>.xml`.
    pub fn copy_description(&self, source: &Path, node_id: Uuid) -> Result<PathBuf> {
        let relative = Path::new(DESCRIPTION_DIR).join(format!("{node_id}.xml"));
        self.copy_into(source, &relative)?;
        Ok(relative)
    }

    /// Copies an alt text file into the SIP as `alt_text/<node>.txt`.
    pub fn copy_alt_text(&self, source: &Path, node_id: Uuid) -> Result<PathBuf> {
        let relative = Path::new(ALT_TEXT_DIR).join(format!("{node_id}.txt"));
        self.copy_into(source, &relative)?;
        Ok(relative)
    }

    fn copy_into(&self, source: &Path, relative: &Path) -> Result<()> {
        let target = self.sip_dir.join(relative);
        std::fs::copy(source, &target)
            .map(|_| ())
            .map_err(|err| SipError::io(source, err))
    }

    /// Serializes the graph and publishes the buffered rows to the shared sinks.
    ///
    /// On failure the SIP directory is removed before the error is returned.
    pub fn commit(
        self,
        redirects: &RedirectMappingService,
        report: &MigrationReportService,
    ) -> Result<CommittedDeposit> {
        if let Err(err) = self.publish(redirects, report) {
            self.discard();
            return Err(err);
        }

        let work_count = self.graph.work_count();
        let file_count = self.graph.all_works().map(|w| w.files.len()).sum();
        info!(
            deposit_id = %self.graph.deposit_id,
            dest_id = %self.graph.dest_id,
            works = work_count,
            files = file_count,
            "committed SIP"
        );
        Ok(CommittedDeposit {
            deposit_id: self.graph.deposit_id,
            dest_id: self.graph.dest_id,
            sip_dir: self.sip_dir,
            work_count,
            file_count,
        })
    }

    /// Every row is encoded before anything shared is written, and redirect
    /// rows are appended only after the graph and report are on disk.
    fn publish(
        &self,
        redirects: &RedirectMappingService,
        report: &MigrationReportService,
    ) -> Result<()> {
        let report_rows = report.encode(&self.report)?;
        let redirect_rows = redirects.encode(self.redirects.rows())?;
        self.graph.write_json(&self.sip_dir.join(MODEL_FILE_NAME))?;
        report.write(&report_rows)?;
        redirects.write(&redirect_rows)
    }

    /// Drops the graph and removes everything written for it so far.
    pub fn discard(self) {
        if let Err(err) = std::fs::remove_dir_all(&self.sip_dir) {
            warn!(
                sip_dir = %self.sip_dir.display(),
                error = %err,
                "failed to remove discarded SIP directory"
            );
        }
    }
}
