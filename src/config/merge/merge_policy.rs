//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources replace earlier values key by key. Arrays are replaced whole.
//! The storage category table merges with the built-in table: user entries add
//! categories or override them, defaults fill the rest.

use crate::artifact::store::default_categories;
use crate::config::ForgeConfig;
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use std::collections::BTreeMap;

/// Create a Config builder with merge policy defaults applied.
///
/// Only scalar defaults live here; section structs fill the rest through serde.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("provider.model", "gpt-4o")?
        .set_default("provider.api_key_env", "OPENAI_API_KEY")?
        .set_default("storage.default_directory", "08_Modern_AI")?
        .set_default("batch.delay_secs", 10)?
        .set_default("batch.default_count", 5)?
        .set_default("batch.catalog", "catalog/modern_ai.toml")?
        .set_default("batch.titles", "catalog/titles.toml")
}

/// Apply table merges that serde defaults cannot express.
pub fn apply_table_defaults(mut config: ForgeConfig) -> ForgeConfig {
    merge_table(&mut config.storage.categories, default_categories());
    config
}

/// Insert every default entry whose key is not already present.
///
/// Keys compare ASCII case-insensitively; file sources may arrive lowercased.
fn merge_table(table: &mut BTreeMap<String, String>, defaults: BTreeMap<String, String>) {
    for (key, value) in defaults {
        if !table.keys().any(|existing| existing.eq_ignore_ascii_case(&key)) {
            table.insert(key, value);
        }
    }
}
