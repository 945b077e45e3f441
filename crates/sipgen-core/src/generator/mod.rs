//! Turns one indexed legacy record into a work with its file children.
//!
//! Both generator variants first resolve every dependency of the record into
//! a [`WorkPlan`] without touching the deposit, then hand the plan to
//! [`commit_work`], which mints ids and writes attachments, provenance,
//! redirect and report rows. A skipped record therefore leaves nothing behind.

mod factory;
mod ordered;
mod simple;

use std::path::PathBuf;

use tracing::{debug, warn};
use uuid::Uuid;

pub use factory::{GeneratorFactory, WorkGenerator};
pub use ordered::OrderedWorkGenerator;
pub use simple::SimpleWorkGenerator;

use crate::context::GenerationContext;
use crate::deposit::DepositBuilder;
use crate::destinations::DestinationEntry;
use crate::error::{Result, SipError, SkipReason};
use crate::graph::{
    AccessSurrogate, FileContent, FileNode, MemberOrder, OriginalDatastream, WorkNode,
};
use crate::mappings::StreamingReference;
use crate::mime;
use crate::model::IndexedRecord;
use crate::premis::NodeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedWork {
    pub legacy_id: String,
    pub work_id: Uuid,
    pub file_ids: Vec<Uuid>,
}

/// Result of building one record: either a work was added to the deposit,
/// or the record was skipped because `force` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(GeneratedWork),
    Skipped {
        legacy_id: String,
        reason: SkipReason,
    },
}

impl GenerationOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, GenerationOutcome::Skipped { .. })
    }
}

/// Where a file's content comes from, in precedence order.
#[derive(Debug, Clone)]
pub(crate) enum ResolvedSource {
    Original(PathBuf),
    Streaming(StreamingReference),
}

/// Mapped source file first, streaming metadata second.
pub(crate) fn resolve_source(ctx: &GenerationContext, legacy_id: &str) -> Option<ResolvedSource> {
    if let Some(entry) = ctx.source_files.get(legacy_id) {
        return Some(ResolvedSource::Original(entry.primary_path().to_path_buf()));
    }
    ctx.streaming
        .reference_for(legacy_id)
        .map(ResolvedSource::Streaming)
}

/// Missing dependency on a whole record: skip under `force`, abort otherwise.
pub(crate) fn skip_or_abort(
    ctx: &GenerationContext,
    legacy_id: &str,
    reason: SkipReason,
) -> Result<GenerationOutcome> {
    if !ctx.options.force {
        return Err(SipError::MissingDependency {
            legacy_id: legacy_id.to_string(),
            reason,
        });
    }
    warn!(
        legacy_id,
        reason = reason.as_str(),
        "skipping object: {reason}"
    );
    Ok(GenerationOutcome::Skipped {
        legacy_id: legacy_id.to_string(),
        reason,
    })
}

/// A file child with every dependency resolved and nothing written yet.
#[derive(Debug, Clone)]
pub(crate) struct PlannedFile {
    /// Legacy object the file came from; `None` for run-synthesized files.
    pub legacy_id: Option<String>,
    pub source: ResolvedSource,
    pub description: Option<PathBuf>,
    pub permissions_id: String,
    pub redirect_key: String,
}

#[derive(Debug)]
pub(crate) struct WorkPlan<'a> {
    pub record: &'a IndexedRecord,
    pub description: PathBuf,
    pub files: Vec<PlannedFile>,
    pub parent_redirect: bool,
    pub single_item: bool,
}

pub(crate) fn commit_work(
    ctx: &GenerationContext,
    destination: &DestinationEntry,
    deposit: &mut DepositBuilder,
    plan: WorkPlan<'_>,
) -> Result<GeneratedWork> {
    let legacy_id = plan.record.legacy_id.as_str();
    let work_id = Uuid::new_v4();

    if plan.parent_redirect {
        deposit.redirects.add_row(legacy_id, work_id, None);
    }
    let description = deposit.copy_description(&plan.description, work_id)?;

    let mut files = Vec::with_capacity(plan.files.len());
    for planned in plan.files {
        files.push(build_file(ctx, deposit, work_id, planned)?);
    }
    let member_order =
        (files.len() > 1).then(|| MemberOrder::new(files.iter().map(|f| f.id).collect()));
    let file_ids: Vec<Uuid> = files.iter().map(|f| f.id).collect();

    let work = WorkNode {
        id: work_id,
        legacy_id: legacy_id.to_string(),
        created: plan.record.created,
        permissions: ctx.permissions.resolve(legacy_id),
        description: Some(description),
        member_order,
        files,
    };
    ctx.premis
        .log_migration(&deposit.premis_dir(), work_id, NodeKind::Work)?;

    deposit
        .report
        .add_work_row(legacy_id, work_id, work.files.len(), plan.single_item);
    for file in &work.files {
        deposit
            .report
            .add_file_row(file.legacy_id.clone(), work_id, file.id, plan.single_item);
    }

    let collection = destination.new_collection.as_deref().and_then(|label| {
        ctx.destinations
            .new_collection_id(label)
            .map(|collection_id| (collection_id, label))
    });
    deposit.graph_mut().add_work(work, collection);

    debug!(
        legacy_id,
        work_id = %work_id,
        files = file_ids.len(),
        "generated work"
    );
    Ok(GeneratedWork {
        legacy_id: legacy_id.to_string(),
        work_id,
        file_ids,
    })
}

fn build_file(
    ctx: &GenerationContext,
    deposit: &mut DepositBuilder,
    work_id: Uuid,
    planned: PlannedFile,
) -> Result<FileNode> {
    let file_id = Uuid::new_v4();

    let content = match planned.source {
        ResolvedSource::Original(path) => FileContent::Original(OriginalDatastream {
            filename: path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string),
            path,
        }),
        ResolvedSource::Streaming(reference) => FileContent::Streaming(reference),
    };

    let (access_surrogate, alt_text) = match planned.legacy_id.as_deref() {
        Some(legacy_id) => {
            let access = ctx.access_files.get(legacy_id).map(|entry| {
                let path = entry.primary_path().to_path_buf();
                AccessSurrogate {
                    mime_type: mime::detect(&path).to_string(),
                    path,
                }
            });
            let alt_text = match ctx.alt_text.get(legacy_id) {
                Some(entry) => Some(deposit.copy_alt_text(entry.primary_path(), file_id)?),
                None => None,
            };
            (access, alt_text)
        }
        None => (None, None),
    };

    let description = match &planned.description {
        Some(path) => Some(deposit.copy_description(path, file_id)?),
        None => None,
    };

    let file = FileNode {
        id: file_id,
        legacy_id: planned.legacy_id,
        content,
        access_surrogate,
        alt_text,
        description,
        permissions: ctx.permissions.resolve(&planned.permissions_id),
    };

    deposit
        .redirects
        .add_row(planned.redirect_key, work_id, Some(file_id));
    ctx.premis
        .log_migration(&deposit.premis_dir(), file_id, NodeKind::File)?;
    Ok(file)
}
