//! Built-in defaults that every load starts from.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with the defaults for every section.
///
/// Defaults are set as keys rather than left to serde so that a partial
/// section in a lower layer does not hide them from a higher one.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("storage.store_path", ".grove/store")?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "file")?
        .set_default("logging.color", true)?
        .set_default("display.default_sort", "custom")?
        .set_default("display.color", true)
}
