//! Command-name contract used in logs.

use crate::cli::parse::Commands;

/// Stable command name for structured log fields.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Batch { .. } => "batch",
        Commands::All { .. } => "all",
        Commands::Generate { .. } => "generate",
        Commands::Validate { .. } => "validate",
        Commands::Audit { .. } => "audit",
        Commands::Repair { .. } => "repair",
        Commands::Catalog { .. } => "catalog",
    }
}

/// Commands that call the generative service and need a credential.
pub fn contacts_service(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Batch { .. } | Commands::All { .. } | Commands::Generate { .. }
    )
}
