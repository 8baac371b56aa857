//! Batch report presentation.

use super::shared::{section_heading, table, to_json, OutputFormat};
use crate::audit::truncate_line;
use crate::batch::BatchReport;
use crate::error::ForgeError;
use owo_colors::OwoColorize;

pub fn format_batch_report(
    report: &BatchReport,
    format: OutputFormat,
) -> Result<String, ForgeError> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_text(report: &BatchReport) -> String {
    let mut out = format!("{}\n\n", section_heading("Batch Report"));
    if report.total() == 0 {
        out.push_str("No specifications were processed.\n");
        return out;
    }

    let mut table = table(vec!["ID", "Title", "Status", "Notes"]);
    for outcome in &report.outcomes {
        let status = if outcome.is_success() {
            format!("{}", "success".green())
        } else {
            format!("{}", "failed".red())
        };
        let notes = match &outcome.error {
            Some(error) => truncate_line(error, 70),
            None => {
                let warnings = outcome.warnings();
                if warnings.is_empty() {
                    outcome
                        .path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                } else {
                    format!("warnings: {}", warnings.join(", "))
                }
            }
        };
        table.add_row(vec![outcome.id.clone(), outcome.title.clone(), status, notes]);
    }
    out.push_str(&table.to_string());
    out.push_str(&format!(
        "\n\nSucceeded: {}/{}  Failed: {}  With warnings: {}\n",
        report.success_count,
        report.total(),
        report.failure_count,
        report.with_warnings()
    ));
    out
}
