//! Error types for the foldertree virtual hierarchy.

use crate::tree::node::NodeId;
use thiserror::Error;

/// Structural errors raised by tree operations
#[derive(Debug, Error)]
pub enum FsError {
    #[error("An item named {0:?} already exists in the target folder")]
    ItemExists(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Cannot move {0:?} into its own subtree")]
    CircularReference(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node is not a folder: {0}")]
    NotAFolder(NodeId),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Snapshot storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tree error while writing snapshot: {0}")]
    Tree(#[from] FsError),
}

impl StorageError {
    /// True when the resource was read but its contents are not a usable
    /// document (invalid UTF-8 or invalid JSON)
    pub fn is_malformed_document(&self) -> bool {
        match self {
            StorageError::Serialization(_) => true,
            StorageError::IoError(e) => e.kind() == std::io::ErrorKind::InvalidData,
            StorageError::Tree(_) => false,
        }
    }
}

/// Application-level errors surfaced by the CLI and configuration layers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Tree error: {0}")]
    Fs(#[from] FsError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Path not found in tree: {0}")]
    PathNotFound(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
