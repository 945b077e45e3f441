use crate::context::GenerationContext;
use crate::deposit::DepositBuilder;
use crate::destinations::DestinationEntry;
use crate::error::{Result, SkipReason};
use crate::generator::{
    commit_work, resolve_source, skip_or_abort, GenerationOutcome, PlannedFile, WorkPlan,
};
use crate::model::IndexedRecord;
use crate::redirect::ORIGINAL_FILE_SUFFIX;

/// Builds a work with exactly one file from a standalone legacy item.
#[derive(Debug)]
pub struct SimpleWorkGenerator<'a> {
    ctx: &'a GenerationContext,
    record: &'a IndexedRecord,
    destination: &'a DestinationEntry,
}

impl<'a> SimpleWorkGenerator<'a> {
    pub(crate) fn new(
        ctx: &'a GenerationContext,
        record: &'a IndexedRecord,
        destination: &'a DestinationEntry,
    ) -> Self {
        Self {
            ctx,
            record,
            destination,
        }
    }

    pub fn generate(&self, deposit: &mut DepositBuilder) -> Result<GenerationOutcome> {
        let legacy_id = self.record.legacy_id.as_str();

        let Some(description) = self.ctx.descriptions.description_path(legacy_id) else {
            return skip_or_abort(self.ctx, legacy_id, SkipReason::NoDescription);
        };
        let Some(source) = resolve_source(self.ctx, legacy_id) else {
            return skip_or_abort(self.ctx, legacy_id, SkipReason::NoSourceFile);
        };

        let plan = WorkPlan {
            record: self.record,
            description,
            files: vec![PlannedFile {
                legacy_id: Some(legacy_id.to_string()),
                source,
                description: None,
                permissions_id: legacy_id.to_string(),
                redirect_key: format!("{legacy_id}{ORIGINAL_FILE_SUFFIX}"),
            }],
            parent_redirect: true,
            single_item: true,
        };
        let generated = commit_work(self.ctx, self.destination, deposit, plan)?;
        Ok(GenerationOutcome::Generated(generated))
    }
}
