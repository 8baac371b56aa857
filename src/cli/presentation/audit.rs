//! Audit and repair report presentation.

use super::shared::{section_heading, table, to_json, OutputFormat};
use crate::artifact::canonical_heading;
use crate::audit::{
    truncate_line, AuditSummary, RepairAction, RepairRecord, RepairSummary, TitleCheckResult,
};
use crate::catalog::TitleTable;
use crate::error::ForgeError;
use owo_colors::OwoColorize;
use serde_json::json;

const FIRST_LINE_WIDTH: usize = 70;

/// Render an audit. With a title table, non-conforming rows show the expected heading.
pub fn format_audit(
    results: &[TitleCheckResult],
    titles: Option<&TitleTable>,
    format: OutputFormat,
) -> Result<String, ForgeError> {
    let summary = AuditSummary::from_results(results);
    let expected = |result: &TitleCheckResult| -> Option<String> {
        let id = result.id.as_deref()?;
        titles?.get(id).map(|title| canonical_heading(id, title))
    };

    if format == OutputFormat::Json {
        let non_conforming: Vec<_> = results
            .iter()
            .filter(|r| !r.conforms)
            .map(|r| {
                json!({
                    "path": r.path,
                    "file_name": r.file_name,
                    "id": r.id,
                    "first_block_narrative": r.first_block_narrative,
                    "current_first_line": truncate_line(&r.current_first_line, FIRST_LINE_WIDTH),
                    "expected_heading": expected(r),
                    "error": r.error,
                })
            })
            .collect();
        return to_json(&json!({
            "summary": summary,
            "conforming_percent": summary.conforming_percent(),
            "non_conforming_percent": summary.non_conforming_percent(),
            "non_conforming": non_conforming,
        }));
    }

    let mut out = format!("{}\n\n", section_heading("Title Audit"));
    out.push_str(&format!("  Total notebooks: {}\n", summary.total));
    out.push_str(&format!(
        "  Conforming: {} ({:.1}%)\n",
        summary.conforming,
        summary.conforming_percent()
    ));
    out.push_str(&format!(
        "  Non-conforming: {} ({:.1}%)\n",
        summary.non_conforming,
        summary.non_conforming_percent()
    ));
    if summary.unreadable > 0 {
        out.push_str(&format!("  Unreadable: {}\n", summary.unreadable));
    }

    if summary.non_conforming == 0 {
        out.push_str(&format!("\n  {}\n", "All notebooks have conforming titles".green()));
        return Ok(out);
    }

    let mut table = table(vec!["File", "Current first line", "Expected heading"]);
    for result in results.iter().filter(|r| !r.conforms) {
        let current = match &result.error {
            Some(error) => format!("(unreadable: {})", truncate_line(error, FIRST_LINE_WIDTH)),
            None if !result.first_block_narrative => "(first block is not narrative)".to_string(),
            None => truncate_line(&result.current_first_line, FIRST_LINE_WIDTH),
        };
        table.add_row(vec![
            result.file_name.clone(),
            current,
            expected(result).unwrap_or_else(|| "-".to_string()),
        ]);
    }
    out.push('\n');
    out.push_str(&table.to_string());
    out.push('\n');
    Ok(out)
}

pub fn format_repair(
    records: &[RepairRecord],
    dry_run: bool,
    format: OutputFormat,
) -> Result<String, ForgeError> {
    let summary = RepairSummary::from_records(records);

    if format == OutputFormat::Json {
        return to_json(&json!({
            "dry_run": dry_run,
            "summary": summary,
            "records": records,
        }));
    }

    let title = if dry_run { "Title Repair (dry run)" } else { "Title Repair" };
    let mut out = format!("{}\n\n", section_heading(title));

    let mut table = table(vec!["File", "Action", "Heading", "Detail"]);
    let mut rows = 0;
    for record in records
        .iter()
        .filter(|r| r.action != RepairAction::AlreadyConforming)
    {
        let label = match record.action {
            RepairAction::Repaired { .. } | RepairAction::WouldRepair { .. } => {
                format!("{}", record.action.label().green())
            }
            RepairAction::Failed { .. } => format!("{}", record.action.label().red()),
            _ => format!("{}", record.action.label().yellow()),
        };
        table.add_row(vec![
            record.file_name.clone(),
            label,
            record.heading.clone().unwrap_or_else(|| "-".to_string()),
            record.action.detail(),
        ]);
        rows += 1;
    }
    if rows > 0 {
        out.push_str(&table.to_string());
        out.push_str("\n\n");
    }

    let changed = if dry_run {
        format!("Would repair: {}", summary.would_repair)
    } else {
        format!("Repaired: {}", summary.repaired)
    };
    out.push_str(&format!(
        "{}  Already conforming: {}  Unknown title: {}  Anomalies: {}  Failed: {}\n",
        changed,
        summary.already_conforming,
        summary.unknown_title,
        summary.anomalies,
        summary.failed
    ));
    Ok(out)
}
