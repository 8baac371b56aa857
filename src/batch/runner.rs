//! Batch orchestration: generate, persist, validate, pause, repeat.
//!
//! Items run strictly one after another. A failing item is recorded and the
//! batch moves on; only the caller decides whether a report is good enough.

use crate::artifact::store::read_artifact;
use crate::artifact::{
    validate, ArtifactStore, CategoryDirectories, ValidationPolicy, ValidationResult,
};
use crate::audit::first_line_conforms;
use crate::batch::report::{BatchReport, GenerationOutcome};
use crate::catalog::Specification;
use crate::error::ForgeError;
use crate::generation::ArtifactGenerator;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Suspension between items.
#[allow(async_fn_in_trait)]
pub trait Pacer {
    async fn pause(&self, delay: Duration);
}

/// Pacer backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Runs specifications through generation, persistence and validation.
pub struct BatchRunner {
    store: ArtifactStore,
    directories: CategoryDirectories,
    policy: ValidationPolicy,
}

impl BatchRunner {
    pub fn new(
        store: ArtifactStore,
        directories: CategoryDirectories,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            store,
            directories,
            policy,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run every specification in order, pausing `delay` between items.
    ///
    /// Always returns a report with exactly one outcome per specification.
    pub async fn run_batch<G: ArtifactGenerator, P: Pacer>(
        &self,
        generator: &G,
        pacer: &P,
        specs: &[Specification],
        delay: Duration,
    ) -> BatchReport {
        let total = specs.len();
        let mut report = BatchReport::new();
        info!(total, delay_secs = delay.as_secs_f64(), "Batch started");

        for (index, spec) in specs.iter().enumerate() {
            debug!(id = %spec.id, index, total, state = "pending", "Item queued");
            let outcome = self.run_item(generator, spec, index, total).await;
            report.record(outcome);

            if index + 1 < total {
                info!(delay_secs = delay.as_secs_f64(), "Waiting before next item");
                pacer.pause(delay).await;
            }
        }

        report.finish();
        info!(
            total,
            success = report.success_count,
            failed = report.failure_count,
            "Batch finished"
        );
        report
    }

    async fn run_item<G: ArtifactGenerator>(
        &self,
        generator: &G,
        spec: &Specification,
        index: usize,
        total: usize,
    ) -> GenerationOutcome {
        info!(id = %spec.id, index, total, state = "generating", "Generating artifact");
        let artifact = match generator.generate(spec).await {
            Ok(artifact) => artifact,
            Err(e) => return self.failed(spec, index, total, &e),
        };

        let path = match self.store.persist(&artifact, spec, &self.directories) {
            Ok(path) => path,
            Err(e) => return self.failed(spec, index, total, &ForgeError::from(e)),
        };

        info!(
            id = %spec.id,
            index,
            total,
            state = "validating",
            path = ?path,
            "Validating artifact"
        );
        let (validation, title_conforms) = self.validate_persisted(&path, &spec.id);
        let outcome = GenerationOutcome::success(spec, path, validation, title_conforms);
        let warnings = outcome.warnings();

        if warnings.is_empty() {
            info!(id = %spec.id, index, total, state = "persisted", "All checks passed");
        } else {
            warn!(
                id = %spec.id,
                index,
                total,
                state = "persisted",
                warnings = ?warnings,
                "Artifact persisted with warnings"
            );
        }
        outcome
    }

    fn failed(
        &self,
        spec: &Specification,
        index: usize,
        total: usize,
        error: &ForgeError,
    ) -> GenerationOutcome {
        warn!(id = %spec.id, index, total, state = "failed", error = %error, "Item failed");
        GenerationOutcome::failed(spec, error)
    }

    // Checks run against what is on disk, not the in-memory artifact.
    fn validate_persisted(&self, path: &Path, id: &str) -> (ValidationResult, bool) {
        let artifact = match read_artifact(path) {
            Ok(artifact) => artifact,
            Err(e) => return (ValidationResult::unreadable(e.to_string()), false),
        };
        let title_conforms = artifact
            .first_block()
            .filter(|block| block.is_narrative())
            .is_some_and(|block| first_line_conforms(&block.first_line(), id));
        (validate(&artifact, &self.policy), title_conforms)
    }
}
