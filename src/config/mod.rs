//! Configuration
//!
//! Layered configuration for the forest store: built-in defaults, the global
//! config file, the workspace config file, then `GROVE__*` environment
//! variables, highest last.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod workspace;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use workspace::storage_paths::StorageConfig;

use crate::logging::LoggingConfig;
use crate::tree::SortMode;
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroveConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// How listings are presented when the command line does not say
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Sort mode used by `list` and `tree` without `--sort`
    #[serde(default)]
    pub default_sort: SortMode,

    /// Colored text output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_sort: SortMode::default(),
            color: default_color(),
        }
    }
}
