//! Structural validation of artifacts.
//!
//! Every check is computed independently; a failing check never hides another.
//! Validation is a pure function of the artifact and the policy.

use crate::artifact::{Artifact, BlockKind};
use serde::{Deserialize, Serialize};

/// Thresholds and marker sets the checks are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    #[serde(default = "default_min_blocks")]
    pub min_blocks: usize,
    #[serde(default = "default_max_blocks")]
    pub max_blocks: usize,
    #[serde(default = "default_max_executable_lines")]
    pub max_executable_lines: usize,
    #[serde(default = "default_diagram_markers")]
    pub diagram_markers: Vec<String>,
    #[serde(default = "default_project_markers")]
    pub project_markers: Vec<String>,
}

fn default_min_blocks() -> usize {
    25
}

fn default_max_blocks() -> usize {
    40
}

fn default_max_executable_lines() -> usize {
    100
}

fn default_diagram_markers() -> Vec<String> {
    vec!["```mermaid".to_string()]
}

fn default_project_markers() -> Vec<String> {
    vec!["Project".to_string(), "## 🎯".to_string()]
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_blocks: default_min_blocks(),
            max_blocks: default_max_blocks(),
            max_executable_lines: default_max_executable_lines(),
            diagram_markers: default_diagram_markers(),
            project_markers: default_project_markers(),
        }
    }
}

impl ValidationPolicy {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_blocks > self.max_blocks {
            return Err(format!(
                "min_blocks ({}) exceeds max_blocks ({})",
                self.min_blocks, self.max_blocks
            ));
        }
        if self.max_executable_lines == 0 {
            return Err("max_executable_lines must be positive".to_string());
        }
        if self.diagram_markers.iter().all(|m| m.is_empty()) {
            return Err("at least one diagram marker is required".to_string());
        }
        if self.project_markers.iter().all(|m| m.is_empty()) {
            return Err("at least one project marker is required".to_string());
        }
        Ok(())
    }
}

/// Raw counts the checks were computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCounts {
    pub blocks: usize,
    pub narrative_blocks: usize,
    pub executable_blocks: usize,
    pub oversized_executable_blocks: usize,
    pub max_executable_lines: usize,
    pub alternation_violations: usize,
    pub diagram_blocks: usize,
    pub project_blocks: usize,
}

/// Outcome of validating one artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub has_blocks: bool,
    pub block_count_in_range: bool,
    pub alternation_ok: bool,
    pub no_oversized_executable: bool,
    pub has_diagram_marker: bool,
    pub has_project_marker: bool,
    /// Set when the artifact could not be decoded; all checks are then false.
    pub parse_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error_message: Option<String>,
    pub counts: ValidationCounts,
}

impl ValidationResult {
    /// Result for an artifact that could not be read at all.
    pub fn unreadable(message: impl Into<String>) -> Self {
        Self {
            parse_error: true,
            parse_error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Named checks in a stable order.
    pub fn checks(&self) -> [(&'static str, bool); 6] {
        [
            ("has_blocks", self.has_blocks),
            ("block_count_in_range", self.block_count_in_range),
            ("alternation_ok", self.alternation_ok),
            ("no_oversized_executable", self.no_oversized_executable),
            ("has_diagram_marker", self.has_diagram_marker),
            ("has_project_marker", self.has_project_marker),
        ]
    }

    pub fn all_passed(&self) -> bool {
        !self.parse_error && self.checks().iter().all(|(_, passed)| *passed)
    }

    /// Names of the failed checks; these are warnings, not errors.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut failed: Vec<&'static str> = self
            .checks()
            .iter()
            .filter(|(_, passed)| !passed)
            .map(|(name, _)| *name)
            .collect();
        if self.parse_error {
            failed.push("parse_error");
        }
        failed
    }
}

/// Validate an artifact against a policy.
pub fn validate(artifact: &Artifact, policy: &ValidationPolicy) -> ValidationResult {
    let mut counts = ValidationCounts {
        blocks: artifact.blocks.len(),
        ..ValidationCounts::default()
    };

    let mut previous: Option<BlockKind> = None;
    for block in &artifact.blocks {
        match block.kind {
            BlockKind::Narrative => {
                counts.narrative_blocks += 1;
                let text = block.text();
                if contains_any(&text, &policy.diagram_markers) {
                    counts.diagram_blocks += 1;
                }
                if contains_any(&text, &policy.project_markers) {
                    counts.project_blocks += 1;
                }
            }
            BlockKind::Executable => {
                counts.executable_blocks += 1;
                let lines = block.line_count();
                counts.max_executable_lines = counts.max_executable_lines.max(lines);
                if lines > policy.max_executable_lines {
                    counts.oversized_executable_blocks += 1;
                }
                if let Some(kind) = previous {
                    if kind != BlockKind::Narrative {
                        counts.alternation_violations += 1;
                    }
                }
            }
            BlockKind::Raw => {}
        }
        previous = Some(block.kind);
    }

    ValidationResult {
        has_blocks: counts.blocks > 0,
        block_count_in_range: (policy.min_blocks..=policy.max_blocks).contains(&counts.blocks),
        alternation_ok: counts.alternation_violations == 0,
        no_oversized_executable: counts.oversized_executable_blocks == 0,
        has_diagram_marker: counts.diagram_blocks > 0,
        has_project_marker: counts.project_blocks > 0,
        parse_error: false,
        parse_error_message: None,
        counts,
    }
}

/// Validate an encoded artifact; undecodable input yields a `parse_error` result.
pub fn validate_encoded(raw: &str, policy: &ValidationPolicy) -> ValidationResult {
    match Artifact::from_json_str(raw) {
        Ok(artifact) => validate(&artifact, policy),
        Err(e) => ValidationResult::unreadable(e.to_string()),
    }
}

fn contains_any(text: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| !marker.is_empty() && text.contains(marker.as_str()))
}
