//! Configuration System
//!
//! Layered configuration for the pipeline: built-in defaults, a user-level file,
//! workspace files and `NBFORGE__*` environment overrides. Every section is
//! validated before any work starts.

use crate::artifact::{CategoryDirectories, ValidationPolicy};
use crate::artifact::store::default_categories;
use crate::audit::AuditPolicy;
use crate::error::ForgeError;
use crate::logging::{validate_logging_config, LoggingConfig};
use crate::provider::CompletionOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod credential;
mod facade;
mod merge;
mod sources;

pub use credential::Credential;
pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForgeConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    /// Structural checks applied to every artifact
    #[serde(default)]
    pub validation: ValidationPolicy,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub audit: AuditPolicy,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generative service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// OpenAI-compatible endpoint; the public API when unset
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    8000
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if self.api_key_env.trim().is_empty() {
            return Err("api_key_env cannot be empty".to_string());
        }
        if !(self.temperature > 0.0 && self.temperature <= 2.0) {
            return Err(format!(
                "Temperature must be in (0, 2], got {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be positive".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be positive".to_string());
        }
        if let Some(base_url) = &self.base_url {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(format!("base_url must be an http(s) URL, got '{}'", base_url));
            }
        }
        Ok(())
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        }
    }

    /// Read the API key from the configured environment variable.
    pub fn resolve_credential(&self) -> Result<Credential, ForgeError> {
        Credential::from_env(&self.api_key_env)
    }
}

/// Prompt settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// File whose contents replace the built-in standards text
    #[serde(default)]
    pub standards_file: Option<PathBuf>,

    /// Share of examples drawn from the specification's domain focus
    #[serde(default = "default_domain_focus_percent")]
    pub domain_focus_percent: u8,
}

fn default_domain_focus_percent() -> u8 {
    60
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            standards_file: None,
            domain_focus_percent: default_domain_focus_percent(),
        }
    }
}

impl GenerationConfig {
    /// Load the standards text, if a file is configured.
    pub fn load_standards(&self, workspace_root: &Path) -> Result<Option<String>, ForgeError> {
        let Some(path) = &self.standards_file else {
            return Ok(None);
        };
        let path = resolve_path(workspace_root, path);
        std::fs::read_to_string(&path).map(Some).map_err(|e| {
            ForgeError::ConfigError(format!(
                "Failed to read standards file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Artifact store layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the artifact tree; the workspace root when unset
    #[serde(default)]
    pub artifact_root: Option<PathBuf>,

    #[serde(default = "default_directory")]
    pub default_directory: String,

    /// Category → directory table
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, String>,
}

fn default_directory() -> String {
    "08_Modern_AI".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            artifact_root: None,
            default_directory: default_directory(),
            categories: default_categories(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.default_directory.trim().is_empty() {
            return Err("default_directory cannot be empty".to_string());
        }
        for (category, directory) in &self.categories {
            if directory.trim().is_empty() {
                return Err(format!("Category '{}' maps to an empty directory", category));
            }
        }
        Ok(())
    }

    pub fn root(&self, workspace_root: &Path) -> PathBuf {
        match &self.artifact_root {
            Some(root) => resolve_path(workspace_root, root),
            None => workspace_root.to_path_buf(),
        }
    }

    pub fn directories(&self) -> CategoryDirectories {
        CategoryDirectories::new(self.categories.clone(), self.default_directory.clone())
    }
}

/// Batch defaults and data files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Pause between items, in seconds
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,

    #[serde(default = "default_count")]
    pub default_count: usize,

    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,

    #[serde(default = "default_titles")]
    pub titles: PathBuf,
}

fn default_delay_secs() -> u64 {
    10
}

fn default_count() -> usize {
    5
}

fn default_catalog() -> PathBuf {
    PathBuf::from("catalog/modern_ai.toml")
}

fn default_titles() -> PathBuf {
    PathBuf::from("catalog/titles.toml")
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            default_count: default_count(),
            catalog: default_catalog(),
            titles: default_titles(),
        }
    }
}

/// Resolve `path` against the workspace unless it is absolute.
pub fn resolve_path(workspace_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace_root.join(path)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Provider(String),
    Generation(String),
    Validation(String),
    Storage(String),
    Batch(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "provider: {}", msg),
            ValidationError::Generation(msg) => write!(f, "generation: {}", msg),
            ValidationError::Validation(msg) => write!(f, "validation: {}", msg),
            ValidationError::Storage(msg) => write!(f, "storage: {}", msg),
            ValidationError::Batch(msg) => write!(f, "batch: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ForgeConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if self.generation.domain_focus_percent > 100 {
            errors.push(ValidationError::Generation(format!(
                "domain_focus_percent must be at most 100, got {}",
                self.generation.domain_focus_percent
            )));
        }
        if let Err(e) = self.validation.validate() {
            errors.push(ValidationError::Validation(e));
        }
        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }
        if self.batch.default_count == 0 {
            errors.push(ValidationError::Batch(
                "default_count must be positive".to_string(),
            ));
        }
        if let Err(e) = validate_logging_config(&self.logging) {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// [`validate`](Self::validate) folded into a single fatal error.
    pub fn ensure_valid(&self) -> Result<(), ForgeError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ForgeError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
