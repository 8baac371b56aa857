//! Helpers shared by every formatter.

use crate::error::{ForgeError, StorageError};
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Report rendering selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self, ForgeError> {
        match value {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ForgeError::ConfigError(format!(
                "Invalid output format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

pub(super) fn to_json<T: Serialize>(value: &T) -> Result<String, ForgeError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ForgeError::StorageError(StorageError::Encoding(e.to_string())))
}

pub(super) fn section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub(super) fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(header);
    table
}

pub(super) fn pass_mark(passed: bool) -> String {
    if passed {
        format!("{}", "✓".green())
    } else {
        format!("{}", "✗".red())
    }
}
