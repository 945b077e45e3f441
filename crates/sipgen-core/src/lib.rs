pub mod config;
pub mod context;
pub mod deposit;
pub mod destinations;
pub mod error;
pub mod generator;
pub mod graph;
pub mod index;
pub mod mappings;
pub mod mime;
pub mod model;
pub mod premis;
pub mod redirect;
pub mod report;
pub mod run;
pub mod sink;

pub use config::{ProjectConfig, RunOptions};
pub use context::GenerationContext;
pub use error::{Result, SipError, SkipReason};
pub use generator::{GenerationOutcome, GeneratorFactory, WorkGenerator};
pub use run::{generate_sips, RunSinks, RunSummary};
