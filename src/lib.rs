//! foldertree: a virtual hierarchical namespace
//!
//! An in-memory tree of folders and typed leaf values with ordered traversal,
//! structural editing, duplicate-name resolution, and a flat JSON snapshot
//! format that maps identifiers to full paths.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod tree;

pub use config::{ConfigLoader, FolderTreeConfig};
pub use error::{ApiError, FsError, StorageError};
pub use store::{FileSnapshotStore, MemorySnapshotStore, Snapshot, SnapshotStore};
pub use tree::{ChangeKind, FileSystem, FsChange, NodeId, NodeKind, Outcome, SortMode};
