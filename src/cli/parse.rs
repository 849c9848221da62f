//! CLI parse: clap types for foldertree. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// foldertree CLI - organize identifiers into an editable folder tree
#[derive(Parser, Debug)]
#[command(name = "foldertree")]
#[command(about = "Inspect and edit a persisted virtual folder tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file (overrides storage.snapshot_path)
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the folder hierarchy
    Tree {
        /// Sort mode (folders-first, folders-last, lexicographical, or an inverse-* mode)
        #[arg(long)]
        sort: Option<String>,
    },
    /// List every leaf with its identifier, path, and depth
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Report whether loading would rewrite the snapshot
    Check,
    /// Load and save again, resolving duplicate names
    Normalize,
    /// Create a folder and every missing ancestor
    Mkdir {
        /// Folder path, e.g. "games/strategy"
        path: String,
    },
    /// Move or rename a folder or leaf
    Mv {
        /// Existing path
        from: String,
        /// Existing folder to move into, or a new full path
        to: String,
    },
    /// Remove a folder or leaf with everything under it
    Rm {
        /// Existing path
        path: String,
    },
    /// Print the effective configuration as TOML
    Config,
}
