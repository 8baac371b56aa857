//! CLI presentation: text and json formatters per command family.

mod audit;
mod batch;
mod catalog;
mod shared;
mod validate;

pub use audit::{format_audit, format_repair};
pub use batch::format_batch_report;
pub use catalog::format_catalog;
pub use shared::OutputFormat;
pub use validate::format_validation;
