use crate::context::GenerationContext;
use crate::deposit::DepositBuilder;
use crate::error::{Result, SipError};
use crate::generator::{GenerationOutcome, OrderedWorkGenerator, SimpleWorkGenerator};
use crate::model::IndexedRecord;

#[derive(Debug)]
pub enum WorkGenerator<'a> {
    Simple(SimpleWorkGenerator<'a>),
    Ordered(OrderedWorkGenerator<'a>),
}

impl WorkGenerator<'_> {
    pub fn variant(&self) -> &'static str {
        match self {
            WorkGenerator::Simple(_) => "simple",
            WorkGenerator::Ordered(_) => "ordered",
        }
    }

    pub fn generate(&self, deposit: &mut DepositBuilder) -> Result<GenerationOutcome> {
        match self {
            WorkGenerator::Simple(generator) => generator.generate(deposit),
            WorkGenerator::Ordered(generator) => generator.generate(deposit),
        }
    }
}

/// Picks the generator variant for each record and wires the shared context into it.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorFactory<'a> {
    ctx: &'a GenerationContext,
}

impl<'a> GeneratorFactory<'a> {
    pub fn new(ctx: &'a GenerationContext) -> Result<Self> {
        ctx.options.validate()?;
        Ok(Self { ctx })
    }

    pub fn context(&self) -> &'a GenerationContext {
        self.ctx
    }

    pub fn create(&self, record: &'a IndexedRecord) -> Result<WorkGenerator<'a>> {
        let destination = self.ctx.destinations.resolve(&record.legacy_id);
        if destination.dest_id.trim().is_empty() {
            return Err(SipError::Configuration(format!(
                "destination for object {} has no container id",
                record.legacy_id
            )));
        }

        if record.structural_type.is_multi_file() {
            let aggregates = self.ctx.aggregates.get()?;
            Ok(WorkGenerator::Ordered(OrderedWorkGenerator::new(
                self.ctx,
                record,
                destination,
                aggregates,
            )))
        } else {
            Ok(WorkGenerator::Simple(SimpleWorkGenerator::new(
                self.ctx,
                record,
                destination,
            )))
        }
    }
}
