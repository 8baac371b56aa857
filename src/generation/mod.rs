pub mod client;
pub mod prompt;
pub mod response;

pub use client::{ArtifactGenerator, GenerationClient};
pub use prompt::{PromptBuilder, DEFAULT_STANDARDS};
pub use response::{extract_notebook_json, parse_artifact};
