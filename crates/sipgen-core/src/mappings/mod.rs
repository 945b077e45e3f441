//! Lookups produced by the earlier mapping stages. All of them are loaded
//! once per run and only read during generation.

pub mod aggregate;
pub mod descriptions;
pub mod paths;
pub mod permissions;
pub mod streaming;

pub use aggregate::{AggregateMappings, AggregateSource};
pub use descriptions::DescriptionService;
pub use paths::{MappingEntry, MappingKind, PathMapping};
pub use permissions::PermissionService;
pub use streaming::{StreamingEntry, StreamingMetadataService, StreamingReference};
