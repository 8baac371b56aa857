//! Single entry point for loading configuration.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::ForgeConfig;
use crate::error::ForgeError;
use config::{File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence, lowest first: built-in defaults, the user-level file,
    /// `config/config.toml`, `config/{NBFORGE_ENV}.toml`, `NBFORGE__*` variables.
    pub fn load(workspace_root: &Path) -> Result<ForgeConfig, ForgeError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: ForgeConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(merge_policy::apply_table_defaults(config))
    }

    /// Load configuration from one explicit file, still honoring env overrides.
    pub fn load_from_file(path: &Path) -> Result<ForgeConfig, ForgeError> {
        if !path.is_file() {
            return Err(ForgeError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(true));
        let builder = environment::add_to_builder(builder);

        let config: ForgeConfig = builder.build()?.try_deserialize()?;
        debug!(config_file = %path.display(), "Configuration loaded");
        Ok(merge_policy::apply_table_defaults(config))
    }

    /// Path of the user-level config file, if a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
