//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Prefix for environment overrides, e.g. `FOLDERTREE__STORAGE__SNAPSHOT_PATH`
pub const ENV_PREFIX: &str = "FOLDERTREE";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("storage.snapshot_path", "foldertree.json")?
        .set_default("storage.include_empty_folders", true)?
        .set_default("traversal.sort_mode", "folders-first")
}

/// Environment variables override every file source.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
