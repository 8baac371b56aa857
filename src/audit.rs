//! Audit and repair pass over an existing artifact store.
//!
//! [`audit`] walks the store and reports, for every artifact, whether its first
//! line carries the `# <id>:` (or `# <id> -`) heading. It never writes.
//! [`repair_all`] applies the title repair to the non-conforming artifacts whose
//! id has a canonical title; everything else is reported, never guessed.

use crate::artifact::repair::{canonical_heading, repair_artifact, repair_title};
use crate::artifact::store::{read_artifact, ARTIFACT_EXTENSION};
use crate::artifact::{RepairAnomaly, RepairOutcome};
use crate::catalog::TitleTable;
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Which parts of the store the audit skips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditPolicy {
    /// Directory names never descended into.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
    /// File name prefixes marking retired artifacts.
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
}

fn default_excluded_dirs() -> Vec<String> {
    vec![".ipynb_checkpoints".to_string()]
}

fn default_excluded_prefixes() -> Vec<String> {
    vec!["X".to_string()]
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            excluded_prefixes: default_excluded_prefixes(),
        }
    }
}

impl AuditPolicy {
    fn excludes_dir(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && self
                .excluded_dirs
                .iter()
                .any(|dir| entry.file_name().to_string_lossy() == dir.as_str())
    }

    fn excludes_file(&self, file_name: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && file_name.starts_with(prefix.as_str()))
    }
}

/// Title check for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleCheckResult {
    pub path: PathBuf,
    pub file_name: String,
    /// Leading numeric token of the file name.
    pub id: Option<String>,
    pub conforms: bool,
    pub first_block_narrative: bool,
    pub current_first_line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Totals over an audit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total: usize,
    pub conforming: usize,
    pub non_conforming: usize,
    pub unreadable: usize,
}

impl AuditSummary {
    pub fn from_results(results: &[TitleCheckResult]) -> Self {
        let conforming = results.iter().filter(|r| r.conforms).count();
        Self {
            total: results.len(),
            conforming,
            non_conforming: results.len() - conforming,
            unreadable: results.iter().filter(|r| r.error.is_some()).count(),
        }
    }

    pub fn conforming_percent(&self) -> f64 {
        percent(self.conforming, self.total)
    }

    pub fn non_conforming_percent(&self) -> f64 {
        percent(self.non_conforming, self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Leading ASCII digits of a file name, if any.
pub fn id_from_file_name(file_name: &str) -> Option<String> {
    let id: String = file_name
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Loose conformance rule used by the audit.
pub fn first_line_conforms(line: &str, id: &str) -> bool {
    line.starts_with(&format!("# {}:", id)) || line.starts_with(&format!("# {} -", id))
}

/// All artifact files under `root`, sorted by path.
pub fn find_artifacts(root: &Path, policy: &AuditPolicy) -> Result<Vec<PathBuf>, StorageError> {
    if !root.is_dir() {
        return Err(StorageError::NotFound(root.to_path_buf()));
    }
    let root = dunce::canonicalize(root).map_err(|e| {
        StorageError::InvalidPath(format!("Failed to canonicalize {:?}: {}", root, e))
    })?;

    let mut paths = Vec::new();
    let walker = WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !policy.excludes_dir(entry));

    for entry in walker {
        let entry = entry.map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to walk directory: {}", e),
            ))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(ARTIFACT_EXTENSION) {
            continue;
        }
        if policy.excludes_file(&entry.file_name().to_string_lossy()) {
            debug!(path = ?path, "Skipping excluded artifact");
            continue;
        }
        paths.push(path.to_path_buf());
    }

    paths.sort();
    Ok(paths)
}

/// Check the title of one artifact. Never fails; read errors land in `error`.
pub fn check_title(path: &Path) -> TitleCheckResult {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let id = id_from_file_name(&file_name);
    let mut result = TitleCheckResult {
        path: path.to_path_buf(),
        file_name,
        id,
        conforms: false,
        first_block_narrative: false,
        current_first_line: String::new(),
        error: None,
    };

    let artifact = match read_artifact(path) {
        Ok(artifact) => artifact,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };

    if let Some(first) = artifact.first_block() {
        if first.is_narrative() {
            result.first_block_narrative = true;
            result.current_first_line = first.first_line();
            result.conforms = result
                .id
                .as_deref()
                .is_some_and(|id| first_line_conforms(&result.current_first_line, id));
        }
    }
    result
}

/// Audit every artifact under `root`. Read-only.
pub fn audit(root: &Path, policy: &AuditPolicy) -> Result<Vec<TitleCheckResult>, StorageError> {
    let paths = find_artifacts(root, policy)?;
    info!(root = ?root, artifacts = paths.len(), "Auditing artifact titles");
    let results: Vec<TitleCheckResult> = paths.iter().map(|path| check_title(path)).collect();
    let summary = AuditSummary::from_results(&results);
    info!(
        total = summary.total,
        conforming = summary.conforming,
        non_conforming = summary.non_conforming,
        "Audit complete"
    );
    Ok(results)
}

/// What `repair_all` did with one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RepairAction {
    Repaired { previous_first_line: String },
    /// Dry run: the artifact would have been repaired.
    WouldRepair { previous_first_line: String },
    AlreadyConforming,
    UnknownTitle,
    Anomaly { anomaly: RepairAnomaly },
    Failed { error: String },
}

impl RepairAction {
    pub fn label(&self) -> &'static str {
        match self {
            RepairAction::Repaired { .. } => "repaired",
            RepairAction::WouldRepair { .. } => "would repair",
            RepairAction::AlreadyConforming => "already conforming",
            RepairAction::UnknownTitle => "unknown",
            RepairAction::Anomaly { .. } => "anomaly",
            RepairAction::Failed { .. } => "failed",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            RepairAction::Repaired {
                previous_first_line,
            }
            | RepairAction::WouldRepair {
                previous_first_line,
            } => format!("was: {}", truncate_line(previous_first_line, 70)),
            RepairAction::AlreadyConforming => String::new(),
            RepairAction::UnknownTitle => RepairAnomaly::UnknownTitle.describe(),
            RepairAction::Anomaly { anomaly } => anomaly.describe(),
            RepairAction::Failed { error } => error.clone(),
        }
    }
}

/// One line of a repair report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRecord {
    pub path: PathBuf,
    pub file_name: String,
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(flatten)]
    pub action: RepairAction,
}

/// Totals over a repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSummary {
    pub repaired: usize,
    pub would_repair: usize,
    pub already_conforming: usize,
    pub unknown_title: usize,
    pub anomalies: usize,
    pub failed: usize,
}

impl RepairSummary {
    pub fn from_records(records: &[RepairRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.action {
                RepairAction::Repaired { .. } => summary.repaired += 1,
                RepairAction::WouldRepair { .. } => summary.would_repair += 1,
                RepairAction::AlreadyConforming => summary.already_conforming += 1,
                RepairAction::UnknownTitle => summary.unknown_title += 1,
                RepairAction::Anomaly { .. } => summary.anomalies += 1,
                RepairAction::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

/// Repair every non-conforming artifact under `root` whose id has a canonical title.
///
/// With `dry_run` the repair is computed in memory and nothing is written.
pub fn repair_all(
    root: &Path,
    titles: &TitleTable,
    policy: &AuditPolicy,
    dry_run: bool,
) -> Result<Vec<RepairRecord>, StorageError> {
    let results = audit(root, policy)?;
    let mut records = Vec::with_capacity(results.len());

    for check in results {
        let heading = check
            .id
            .as_deref()
            .and_then(|id| titles.get(id).map(|title| canonical_heading(id, title)));
        let action = repair_one(&check, titles, dry_run);

        match &action {
            RepairAction::Repaired { .. } => {
                info!(path = ?check.path, heading = ?heading, "Repaired title")
            }
            RepairAction::Failed { error } => {
                warn!(path = ?check.path, error = %error, "Title repair failed")
            }
            RepairAction::AlreadyConforming => {}
            other => debug!(path = ?check.path, action = other.label(), "Skipped title repair"),
        }

        records.push(RepairRecord {
            path: check.path,
            file_name: check.file_name,
            id: check.id,
            heading,
            action,
        });
    }

    let summary = RepairSummary::from_records(&records);
    info!(
        repaired = summary.repaired,
        would_repair = summary.would_repair,
        unknown_title = summary.unknown_title,
        anomalies = summary.anomalies,
        failed = summary.failed,
        dry_run,
        "Repair pass complete"
    );
    Ok(records)
}

fn repair_one(check: &TitleCheckResult, titles: &TitleTable, dry_run: bool) -> RepairAction {
    if check.conforms {
        return RepairAction::AlreadyConforming;
    }
    if let Some(message) = &check.error {
        return RepairAction::Anomaly {
            anomaly: RepairAnomaly::Unreadable {
                message: message.clone(),
            },
        };
    }
    let Some(id) = check.id.as_deref() else {
        return RepairAction::Anomaly {
            anomaly: RepairAnomaly::MissingId,
        };
    };
    let Some(title) = titles.get(id) else {
        return RepairAction::UnknownTitle;
    };

    let outcome = if dry_run {
        read_artifact(&check.path).map(|mut artifact| repair_artifact(&mut artifact, id, title))
    } else {
        repair_title(&check.path, id, title)
    };

    match outcome {
        Ok(RepairOutcome::Repaired {
            previous_first_line,
            ..
        }) => {
            if dry_run {
                RepairAction::WouldRepair {
                    previous_first_line,
                }
            } else {
                RepairAction::Repaired {
                    previous_first_line,
                }
            }
        }
        Ok(RepairOutcome::Unchanged {
            anomaly: Some(anomaly),
        }) => RepairAction::Anomaly { anomaly },
        Ok(RepairOutcome::Unchanged { anomaly: None }) => RepairAction::AlreadyConforming,
        Err(e) => RepairAction::Failed {
            error: e.to_string(),
        },
    }
}

/// Truncate to at most `max` characters, marking the cut with `...`.
pub fn truncate_line(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max).collect();
        format!("{}...", cut)
    }
}
