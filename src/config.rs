//! Configuration System
//!
//! Layered configuration for the foldertree CLI and embedding hosts: built-in
//! defaults, a global file, a workspace file, then environment overrides.

use crate::error::{ApiError, FsError};
use crate::logging::{self, LoggingConfig};
use crate::tree::SortMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderTreeConfig {
    /// Snapshot location and save options
    #[serde(default)]
    pub storage: StorageConfig,

    /// Traversal defaults
    #[serde(default)]
    pub traversal: TraversalConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot file; relative paths resolve against the workspace root
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Persist empty folders alongside leaf paths
    #[serde(default = "default_true")]
    pub include_empty_folders: bool,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("foldertree.json")
}

fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            include_empty_folders: true,
        }
    }
}

impl StorageConfig {
    /// Snapshot path resolved against `workspace_root`
    pub fn resolve_snapshot_path(&self, workspace_root: &Path) -> PathBuf {
        if self.snapshot_path.is_absolute() {
            self.snapshot_path.clone()
        } else {
            workspace_root.join(&self.snapshot_path)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.snapshot_path.as_os_str().is_empty() {
            return Err("Snapshot path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Traversal settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Default sort mode name, e.g. "folders-first"
    #[serde(default = "default_sort_mode")]
    pub sort_mode: String,
}

fn default_sort_mode() -> String {
    SortMode::default().to_string()
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            sort_mode: default_sort_mode(),
        }
    }
}

impl TraversalConfig {
    pub fn sort_mode(&self) -> Result<SortMode, FsError> {
        self.sort_mode.parse()
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Storage(String),
    Traversal(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Traversal(msg) => write!(f, "Traversal: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FolderTreeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }

        if let Err(e) = self.traversal.sort_mode() {
            errors.push(ValidationError::Traversal(e.to_string()));
        }

        if let Err(e) = logging::validate_format(&self.logging.format) {
            errors.push(ValidationError::Logging(e.to_string()));
        }
        if let Err(e) = logging::validate_output(&self.logging.output) {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one `ApiError`
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))
    }
}
