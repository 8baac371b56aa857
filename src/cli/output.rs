//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ForgeError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ForgeError) -> String {
    match e {
        ForgeError::MissingCredential(var) => format!(
            "{}\nExport the API key first, e.g. `export {}=...`",
            e, var
        ),
        _ => e.to_string(),
    }
}
