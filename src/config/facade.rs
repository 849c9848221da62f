//! Entry point for building a [`FolderTreeConfig`] from all sources.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::FolderTreeConfig;
use config::{ConfigError, File};
use std::path::Path;
use tracing::debug;

/// Loads configuration with the merge policy's precedence
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, the global file, workspace files, then environment overrides
    pub fn load(workspace_root: &Path) -> Result<FolderTreeConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config: FolderTreeConfig = builder
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load a single explicit file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<FolderTreeConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()
    }
}
