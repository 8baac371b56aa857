//! Batch generation pipeline.

pub mod report;
pub mod runner;

pub use report::{BatchReport, GenerationOutcome, OutcomeStatus};
pub use runner::{BatchRunner, Pacer, TokioPacer};
