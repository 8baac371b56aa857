//! Per-check listing for `nbforge validate`.

use super::shared::{pass_mark, section_heading, to_json, OutputFormat};
use crate::artifact::ValidationResult;
use crate::error::ForgeError;
use serde_json::json;
use std::path::Path;

pub fn format_validation(
    path: &Path,
    result: &ValidationResult,
    format: OutputFormat,
) -> Result<String, ForgeError> {
    match format {
        OutputFormat::Json => to_json(&json!({
            "path": path,
            "all_passed": result.all_passed(),
            "result": result,
        })),
        OutputFormat::Text => Ok(format_text(path, result)),
    }
}

fn format_text(path: &Path, result: &ValidationResult) -> String {
    let mut out = format!("{}\n", section_heading("Validation"));
    out.push_str(&format!("  File: {}\n\n", path.display()));

    if result.parse_error {
        out.push_str(&format!(
            "  {} parse_error: {}\n",
            pass_mark(false),
            result.parse_error_message.as_deref().unwrap_or("unreadable")
        ));
        return out;
    }

    for (name, passed) in result.checks() {
        out.push_str(&format!("  {} {}\n", pass_mark(passed), name));
    }
    let counts = &result.counts;
    out.push_str(&format!(
        "\n  Blocks: {} ({} narrative, {} executable)\n",
        counts.blocks, counts.narrative_blocks, counts.executable_blocks
    ));
    out.push_str(&format!(
        "  Longest executable block: {} lines\n",
        counts.max_executable_lines
    ));
    if result.all_passed() {
        out.push_str("\n  All checks passed\n");
    } else {
        out.push_str(&format!("\n  Warnings: {}\n", result.warnings().join(", ")));
    }
    out
}
