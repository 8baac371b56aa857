//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, contacts_service};
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::OutputFormat;
pub use route::{confirmation_prompt, RunContext};
