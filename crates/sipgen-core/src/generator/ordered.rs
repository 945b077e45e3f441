use tracing::warn;

use crate::context::GenerationContext;
use crate::deposit::DepositBuilder;
use crate::destinations::DestinationEntry;
use crate::error::{Result, SipError, SkipReason};
use crate::generator::{
    commit_work, resolve_source, skip_or_abort, GenerationOutcome, PlannedFile, ResolvedSource,
    WorkPlan,
};
use crate::mappings::{AggregateMappings, MappingEntry};
use crate::model::{IndexedRecord, StructuralType};

pub const AGGREGATE_TOP_SUFFIX: &str = "/aggregate_top";
pub const AGGREGATE_BOTTOM_SUFFIX: &str = "/aggregate_bottom";

/// Builds a multi-file work from a compound object or grouped work, keeping
/// the index order of its children and wrapping them with any aggregate files.
#[derive(Debug)]
pub struct OrderedWorkGenerator<'a> {
    ctx: &'a GenerationContext,
    record: &'a IndexedRecord,
    destination: &'a DestinationEntry,
    aggregates: &'a AggregateMappings,
}

impl<'a> OrderedWorkGenerator<'a> {
    pub(crate) fn new(
        ctx: &'a GenerationContext,
        record: &'a IndexedRecord,
        destination: &'a DestinationEntry,
        aggregates: &'a AggregateMappings,
    ) -> Self {
        Self {
            ctx,
            record,
            destination,
            aggregates,
        }
    }

    pub fn generate(&self, deposit: &mut DepositBuilder) -> Result<GenerationOutcome> {
        let legacy_id = self.record.legacy_id.as_str();

        let Some(description) = self.ctx.descriptions.description_path(legacy_id) else {
            return skip_or_abort(self.ctx, legacy_id, SkipReason::NoDescription);
        };

        let mut files = Vec::new();
        if let Some(top) = self.aggregates.top_for(legacy_id) {
            files.push(self.aggregate_file(top, AGGREGATE_TOP_SUFFIX));
        }

        for child in self.ctx.index.children_of(legacy_id) {
            let child_id = child.legacy_id.as_str();
            let Some(source) = resolve_source(self.ctx, child_id) else {
                if !self.ctx.options.force {
                    return Err(SipError::MissingDependency {
                        legacy_id: child_id.to_string(),
                        reason: SkipReason::NoSourceFile,
                    });
                }
                warn!(
                    legacy_id = child_id,
                    parent_id = legacy_id,
                    reason = SkipReason::NoSourceFile.as_str(),
                    "skipping child object: {}",
                    SkipReason::NoSourceFile
                );
                continue;
            };
            files.push(PlannedFile {
                legacy_id: Some(child_id.to_string()),
                source,
                description: self.ctx.descriptions.description_path(child_id),
                permissions_id: child_id.to_string(),
                redirect_key: child_id.to_string(),
            });
        }

        if let Some(bottom) = self.aggregates.bottom_for(legacy_id) {
            files.push(self.aggregate_file(bottom, AGGREGATE_BOTTOM_SUFFIX));
        }

        if files.is_empty() {
            return skip_or_abort(self.ctx, legacy_id, SkipReason::NoChildren);
        }

        let plan = WorkPlan {
            record: self.record,
            description,
            files,
            // Grouped works have no single legacy object to redirect from.
            parent_redirect: self.record.structural_type != StructuralType::GroupedWork,
            single_item: false,
        };
        let generated = commit_work(self.ctx, self.destination, deposit, plan)?;
        Ok(GenerationOutcome::Generated(generated))
    }

    fn aggregate_file(&self, entry: &MappingEntry, suffix: &str) -> PlannedFile {
        let legacy_id = self.record.legacy_id.as_str();
        PlannedFile {
            legacy_id: None,
            source: ResolvedSource::Original(entry.primary_path().to_path_buf()),
            description: None,
            permissions_id: legacy_id.to_string(),
            redirect_key: format!("{legacy_id}{suffix}"),
        }
    }
}
