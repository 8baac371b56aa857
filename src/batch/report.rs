//! Per-item outcomes and the batch report.

use crate::artifact::ValidationResult;
use crate::catalog::Specification;
use crate::error::{ErrorKind, ForgeError};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

/// What happened to one specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub id: String,
    pub title: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    /// Whether the persisted artifact opens with its `# <id>:` heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_conforms: Option<bool>,
}

impl GenerationOutcome {
    pub fn success(
        spec: &Specification,
        path: PathBuf,
        validation: ValidationResult,
        title_conforms: bool,
    ) -> Self {
        Self {
            id: spec.id.clone(),
            title: spec.display_title(),
            status: OutcomeStatus::Success,
            path: Some(path),
            error: None,
            error_kind: None,
            validation: Some(validation),
            title_conforms: Some(title_conforms),
        }
    }

    pub fn failed(spec: &Specification, error: &ForgeError) -> Self {
        Self {
            id: spec.id.clone(),
            title: spec.display_title(),
            status: OutcomeStatus::Failed,
            path: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            validation: None,
            title_conforms: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Failed validation checks; empty for failed items.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = self
            .validation
            .as_ref()
            .map(ValidationResult::warnings)
            .unwrap_or_default();
        if self.title_conforms == Some(false) {
            warnings.push("title_heading");
        }
        warnings
    }
}

/// Ordered outcomes of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<GenerationOutcome>,
    pub success_count: usize,
    pub failure_count: usize,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            success_count: 0,
            failure_count: 0,
            started_at: timestamp(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, outcome: GenerationOutcome) {
        match outcome.status {
            OutcomeStatus::Success => self.success_count += 1,
            OutcomeStatus::Failed => self.failure_count += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(timestamp());
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &GenerationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn successes(&self) -> impl Iterator<Item = &GenerationOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    /// Successful items with at least one failed check.
    pub fn with_warnings(&self) -> usize {
        self.successes().filter(|o| !o.warnings().is_empty()).count()
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
