//! Error types for the notebook generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Artifact store errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Artifact encoding error: {0}")]
    Encoding(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Crate-wide error.
///
/// Configuration-class variants are fatal to a whole run. Provider, response and
/// storage variants are per-item failures that the batch runner records and
/// moves past.
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

/// Coarse error classes used for reporting and run-level decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Generation,
    MalformedResponse,
    Storage,
}

impl ForgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForgeError::ConfigError(_)
            | ForgeError::MissingCredential(_)
            | ForgeError::CatalogError(_) => ErrorKind::Configuration,
            ForgeError::ProviderError(_)
            | ForgeError::ProviderRequestFailed(_)
            | ForgeError::ProviderAuthFailed(_)
            | ForgeError::ProviderRateLimit(_)
            | ForgeError::ProviderModelNotFound(_)
            | ForgeError::EmptyResponse => ErrorKind::Generation,
            ForgeError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ForgeError::StorageError(_) => ErrorKind::Storage,
        }
    }

    /// True when the error must abort a run before (or instead of) any item work.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

impl From<config::ConfigError> for ForgeError {
    fn from(err: config::ConfigError) -> Self {
        ForgeError::ConfigError(err.to_string())
    }
}
