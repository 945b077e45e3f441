use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{error, info};
use uuid::Uuid;

use crate::context::GenerationContext;
use crate::deposit::DepositBuilder;
use crate::error::{Result, SipError, SkipReason};
use crate::generator::{GenerationOutcome, GeneratorFactory};
use crate::model::IndexedRecord;
use crate::redirect::RedirectMappingService;
use crate::report::MigrationReportService;

/// Shared, append-only outputs every committed deposit publishes to.
#[derive(Debug, Clone, Copy)]
pub struct RunSinks<'a> {
    pub redirects: &'a RedirectMappingService,
    pub report: &'a MigrationReportService,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedObject {
    pub legacy_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct SipSummary {
    pub dest_id: String,
    /// `None` when every record for this destination was skipped.
    pub deposit_id: Option<Uuid>,
    pub sip_dir: Option<PathBuf>,
    pub generated: Vec<String>,
    pub skipped: Vec<SkippedObject>,
    pub file_count: usize,
}

#[derive(Debug)]
pub struct DestinationFailure {
    pub dest_id: String,
    pub error: SipError,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub sips: Vec<SipSummary>,
    pub failures: Vec<DestinationFailure>,
}

impl RunSummary {
    pub fn generated_count(&self) -> usize {
        self.sips.iter().map(|s| s.generated.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.sips.iter().map(|s| s.skipped.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Top-level records grouped by destination container, each group in
/// legacy-ID order.
pub fn partition_by_destination(ctx: &GenerationContext) -> Vec<(String, Vec<&IndexedRecord>)> {
    let mut groups: Vec<(String, Vec<&IndexedRecord>)> = Vec::new();
    for record in ctx.index.top_level() {
        let dest_id = &ctx.destinations.resolve(&record.legacy_id).dest_id;
        match groups.iter_mut().find(|(existing, _)| existing == dest_id) {
            Some((_, records)) => records.push(record),
            None => groups.push((dest_id.clone(), vec![record])),
        }
    }
    groups
}

/// Builds one SIP per destination container, each on its own thread, with at
/// most `max_parallel` destinations (default: available parallelism) in flight.
///
/// A fatal error discards only the deposit it happened in; deposits for
/// other destinations still commit and the error is reported in
/// [`RunSummary::failures`]. Configuration problems fail the run before any
/// record is processed.
pub fn generate_sips(
    ctx: &GenerationContext,
    sips_dir: &Path,
    sinks: RunSinks<'_>,
) -> Result<RunSummary> {
    let factory = GeneratorFactory::new(ctx)?;
    let groups = partition_by_destination(ctx);
    if let Some((_, records)) = groups.iter().find(|(dest, _)| dest.trim().is_empty()) {
        return Err(SipError::Configuration(format!(
            "destination for object {} has no container id",
            records[0].legacy_id
        )));
    }
    std::fs::create_dir_all(sips_dir).map_err(|err| SipError::io(sips_dir, err))?;

    let workers = ctx.options.max_parallel.map_or_else(
        || thread::available_parallelism().map_or(1, NonZeroUsize::get),
        NonZeroUsize::get,
    );
    info!(
        destinations = groups.len(),
        workers,
        force = ctx.options.force,
        "starting SIP generation"
    );

    let mut results: Vec<(String, Result<SipSummary>)> = Vec::with_capacity(groups.len());
    for batch in groups.chunks(workers) {
        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|(dest_id, records)| {
                    let handle = scope.spawn(move || {
                        build_destination(factory, sips_dir, dest_id, records, sinks)
                    });
                    (dest_id.clone(), handle)
                })
                .collect();
            for (dest_id, handle) in handles {
                match handle.join() {
                    Ok(result) => results.push((dest_id, result)),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });
    }

    let mut summary = RunSummary::default();
    for (dest_id, result) in results {
        match result {
            Ok(sip) => summary.sips.push(sip),
            Err(err) => {
                error!(dest_id = %dest_id, error = %err, "SIP generation failed");
                summary.failures.push(DestinationFailure {
                    dest_id,
                    error: err,
                });
            }
        }
    }
    Ok(summary)
}

/// Builds and commits the deposit for one destination. Runs entirely on the
/// calling thread.
pub fn build_destination<'a>(
    factory: GeneratorFactory<'a>,
    sips_dir: &Path,
    dest_id: &str,
    records: &[&'a IndexedRecord],
    sinks: RunSinks<'_>,
) -> Result<SipSummary> {
    let mut deposit = DepositBuilder::create(sips_dir, dest_id)?;
    let mut generated = Vec::new();
    let mut skipped = Vec::new();

    for &record in records {
        let outcome = factory
            .create(record)
            .and_then(|generator| generator.generate(&mut deposit));
        match outcome {
            Ok(GenerationOutcome::Generated(work)) => generated.push(work.legacy_id),
            Ok(GenerationOutcome::Skipped { legacy_id, reason }) => {
                skipped.push(SkippedObject { legacy_id, reason })
            }
            Err(err) => {
                deposit.discard();
                return Err(err);
            }
        }
    }

    if generated.is_empty() {
        deposit.discard();
        return Ok(SipSummary {
            dest_id: dest_id.to_string(),
            deposit_id: None,
            sip_dir: None,
            generated,
            skipped,
            file_count: 0,
        });
    }

    let committed = deposit.commit(sinks.redirects, sinks.report)?;
    Ok(SipSummary {
        dest_id: committed.dest_id,
        deposit_id: Some(committed.deposit_id),
        sip_dir: Some(committed.sip_dir),
        generated,
        skipped,
        file_count: committed.file_count,
    })
}
