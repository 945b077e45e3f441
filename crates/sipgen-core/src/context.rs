use tracing::info;

use crate::config::{ProjectConfig, RunOptions};
use crate::destinations::DestinationRouter;
use crate::error::Result;
use crate::index::RecordIndex;
use crate::mappings::{
    AggregateSource, DescriptionService, MappingKind, PathMapping, PermissionService,
    StreamingMetadataService,
};
use crate::premis::PremisLogger;

/// Everything a generator reads. Built once per run and shared immutably by
/// every generator, including those running on other destination threads.
#[derive(Debug)]
pub struct GenerationContext {
    pub options: RunOptions,
    pub index: RecordIndex,
    pub destinations: DestinationRouter,
    pub source_files: PathMapping,
    pub access_files: PathMapping,
    pub alt_text: PathMapping,
    pub permissions: PermissionService,
    pub streaming: StreamingMetadataService,
    pub descriptions: DescriptionService,
    pub aggregates: AggregateSource,
    pub premis: PremisLogger,
}

impl GenerationContext {
    /// Loads every collaborator named by `config`. Aggregate mappings are
    /// only located here; they are read on first use. A parallelism limit
    /// set on `options` wins over the configured one.
    pub fn load(config: &ProjectConfig, options: RunOptions) -> Result<Self> {
        options.validate()?;
        let max_parallel = options.max_parallel.or(config.max_parallel_destinations);
        let options = options.with_max_parallel(max_parallel);

        let index = RecordIndex::load_csv(&config.index)?;
        let destinations = DestinationRouter::load_csv(&config.destinations)?;
        let source_files = PathMapping::load_csv(MappingKind::SourceFile, &config.source_files)?;
        let access_files =
            PathMapping::load_optional(MappingKind::AccessFile, config.access_files.as_deref())?;
        let alt_text = PathMapping::load_optional(MappingKind::AltText, config.alt_text.as_deref())?;
        let permissions = PermissionService::load_optional(config.permissions.as_deref())?;
        let streaming = StreamingMetadataService::load_optional(
            config.streaming_base_url.clone(),
            config.streaming_metadata.as_deref(),
        )?;

        info!(
            project = %config.project_name,
            records = index.len(),
            source_files = source_files.len(),
            access_files = access_files.len(),
            "loaded generation context"
        );

        Ok(Self {
            premis: PremisLogger::new(config.software_agent.clone(), options.username.clone()),
            options,
            index,
            destinations,
            source_files,
            access_files,
            alt_text,
            permissions,
            streaming,
            descriptions: DescriptionService::new(config.descriptions_dir.clone()),
            aggregates: AggregateSource::from_paths(
                config.aggregate_top.clone(),
                config.aggregate_bottom.clone(),
            ),
        })
    }
}
