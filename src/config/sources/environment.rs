//! Environment overrides: `NBFORGE__SECTION__KEY=value`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Double underscores keep single-underscore keys such as `delay_secs` intact.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("NBFORGE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
