//! Title repair for existing artifacts.
//!
//! The first narrative block of every artifact should open with the canonical
//! heading `# <id>: <title>`. Repair replaces whatever heading is there, keeps
//! the rest of that block verbatim, and leaves every other block untouched.

use crate::artifact::store::{read_artifact, write_artifact};
use crate::artifact::{Artifact, BlockKind};
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Why an artifact was left alone instead of repaired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "anomaly", rename_all = "snake_case")]
pub enum RepairAnomaly {
    /// The first block is executable or raw; there is no heading to fix.
    NotNarrative { kind: BlockKind },
    EmptyArtifact,
    /// No canonical title is known for the artifact's id.
    UnknownTitle,
    /// The file name does not start with a numeric id.
    MissingId,
    Unreadable { message: String },
}

impl RepairAnomaly {
    pub fn describe(&self) -> String {
        match self {
            RepairAnomaly::NotNarrative { kind } => {
                format!("first block is {:?}, not narrative", kind).to_lowercase()
            }
            RepairAnomaly::EmptyArtifact => "artifact has no blocks".to_string(),
            RepairAnomaly::UnknownTitle => {
                "unknown title: no canonical title available".to_string()
            }
            RepairAnomaly::MissingId => "file name carries no numeric id".to_string(),
            RepairAnomaly::Unreadable { message } => format!("unreadable: {}", message),
        }
    }
}

/// Result of repairing one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepairOutcome {
    Unchanged {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        anomaly: Option<RepairAnomaly>,
    },
    Repaired {
        previous_first_line: String,
        heading: String,
    },
}

impl RepairOutcome {
    pub fn is_repaired(&self) -> bool {
        matches!(self, RepairOutcome::Repaired { .. })
    }

    pub fn anomaly(&self) -> Option<&RepairAnomaly> {
        match self {
            RepairOutcome::Unchanged { anomaly } => anomaly.as_ref(),
            RepairOutcome::Repaired { .. } => None,
        }
    }
}

/// Canonical heading line, NFC-normalized.
pub fn canonical_heading(id: &str, title: &str) -> String {
    format!("# {}: {}", id.trim(), title.trim()).nfc().collect()
}

/// True when `line` already is the canonical heading.
pub fn heading_conforms(line: &str, id: &str, title: &str) -> bool {
    let normalized: String = line.trim().nfc().collect();
    normalized == canonical_heading(id, title)
}

/// Apply the title repair to an in-memory artifact.
///
/// Returns what was done; the artifact is only modified when the outcome is
/// [`RepairOutcome::Repaired`].
pub fn repair_artifact(artifact: &mut Artifact, id: &str, title: &str) -> RepairOutcome {
    let Some(first) = artifact.blocks.first_mut() else {
        return RepairOutcome::Unchanged {
            anomaly: Some(RepairAnomaly::EmptyArtifact),
        };
    };
    if first.kind != BlockKind::Narrative {
        return RepairOutcome::Unchanged {
            anomaly: Some(RepairAnomaly::NotNarrative { kind: first.kind }),
        };
    }

    let previous_first_line = first.first_line();
    if heading_conforms(&previous_first_line, id, title) {
        return RepairOutcome::Unchanged { anomaly: None };
    }

    let heading = canonical_heading(id, title);
    let rewritten = replace_heading(&first.text(), &heading);
    first.set_text(&rewritten);

    RepairOutcome::Repaired {
        previous_first_line,
        heading,
    }
}

/// Repair the title of the artifact at `path` in place.
///
/// Idempotent: a second call on a repaired artifact reports `Unchanged` and
/// does not touch the file.
pub fn repair_title(path: &Path, id: &str, title: &str) -> Result<RepairOutcome, StorageError> {
    let mut artifact = read_artifact(path)?;
    let outcome = repair_artifact(&mut artifact, id, title);
    if outcome.is_repaired() {
        write_artifact(&artifact, path)?;
    }
    Ok(outcome)
}

/// Replace the heading of a narrative block's text.
///
/// Leading blank lines are skipped. The first remaining line is discarded when
/// it is a markdown heading or stands alone (followed by a blank line or
/// nothing); otherwise it is body text and is kept.
fn replace_heading(text: &str, heading: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut rest = skip_blank(&lines);

    if let Some((first, tail)) = rest.split_first() {
        let standalone = tail.first().map_or(true, |next| next.trim().is_empty());
        if first.trim_start().starts_with('#') || standalone {
            rest = skip_blank(tail);
        }
    }

    let body = rest.join("\n");
    if body.is_empty() {
        heading.to_string()
    } else {
        format!("{}\n\n{}", heading, body)
    }
}

fn skip_blank<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    &lines[start..]
}
