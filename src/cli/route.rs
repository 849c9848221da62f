//! CLI route: single route table and run context.
//!
//! Every command loads the snapshot into a `FileSystem<String>` whose leaf
//! payloads are the snapshot's own identifiers, so the snapshot is the only
//! data source the CLI needs.

use crate::cli::parse::Commands;
use crate::cli::presentation::{format_config, format_list_json, format_list_text, format_tree};
use crate::config::{ConfigLoader, FolderTreeConfig};
use crate::error::{ApiError, FsError};
use crate::store::{FileSnapshotStore, Snapshot};
use crate::tree::path::split_path;
use crate::tree::{FileSystem, NodeId, Outcome, SortMode};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Runtime context for CLI execution: workspace, effective config, snapshot location.
pub struct RunContext {
    workspace_root: PathBuf,
    config: FolderTreeConfig,
    snapshot_path: PathBuf,
    color: bool,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        snapshot_override: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Self::with_config(workspace_root, config, snapshot_override)
    }

    /// Create run context from an already loaded configuration
    pub fn with_config(
        workspace_root: PathBuf,
        config: FolderTreeConfig,
        snapshot_override: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        config.ensure_valid()?;
        let snapshot_path = match snapshot_override {
            Some(path) if path.is_absolute() => path,
            Some(path) => workspace_root.join(path),
            None => config.storage.resolve_snapshot_path(&workspace_root),
        };
        Ok(Self {
            workspace_root,
            config,
            snapshot_path,
            color: false,
        })
    }

    /// Enable or disable colored tree output
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn config(&self) -> &FolderTreeConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Tree { sort } => {
                let mode = match sort {
                    Some(name) => name.parse::<SortMode>()?,
                    None => self.config.traversal.sort_mode()?,
                };
                let (fs, _) = self.load_tree()?;
                let title = self.snapshot_path.display().to_string();
                format_tree(&fs, mode, &title, self.color)
            }
            Commands::List { format } => {
                let (fs, _) = self.load_tree()?;
                match format.as_str() {
                    "json" => format_list_json(&fs),
                    "text" => format_list_text(&fs),
                    other => Err(ApiError::ConfigError(format!(
                        "Invalid list format: {} (must be 'text' or 'json')",
                        other
                    ))),
                }
            }
            Commands::Check => {
                let (fs, changed) = self.load_tree()?;
                let status = if changed {
                    "would be rewritten"
                } else {
                    "is up to date"
                };
                Ok(format!(
                    "Snapshot {} {} ({} folders, {} leaves)",
                    self.snapshot_path.display(),
                    status,
                    fs.total_descendants() - fs.total_leaves(),
                    fs.total_leaves()
                ))
            }
            Commands::Normalize => {
                let (fs, changed) = self.load_tree()?;
                self.save_tree(&fs)?;
                Ok(if changed {
                    format!("Normalized {}", self.snapshot_path.display())
                } else {
                    format!("{} was already normalized", self.snapshot_path.display())
                })
            }
            Commands::Mkdir { path } => {
                let (mut fs, _) = self.load_tree()?;
                let (outcome, _) = fs.create_all_folders(path)?;
                if outcome == Outcome::SuccessNothingDone {
                    return Ok(format!("Folder {} already exists", path));
                }
                self.save_tree(&fs)?;
                Ok(format!("Created folder {}", path))
            }
            Commands::Mv { from, to } => {
                let (mut fs, _) = self.load_tree()?;
                let source = fs
                    .find(from)
                    .filter(|id| !id.is_root())
                    .ok_or_else(|| ApiError::PathNotFound(from.clone()))?;
                move_path(&mut fs, source, to)?;
                self.save_tree(&fs)?;
                Ok(format!("Moved {} to {}", from, fs.full_path(source)?))
            }
            Commands::Rm { path } => {
                let (mut fs, _) = self.load_tree()?;
                let target = fs
                    .find(path)
                    .filter(|id| !id.is_root())
                    .ok_or_else(|| ApiError::PathNotFound(path.clone()))?;
                let removed = fs.remove(target)?;
                self.save_tree(&fs)?;
                Ok(format!("Removed {} ({} nodes)", path, removed))
            }
            Commands::Config => format_config(&self.config),
        }
    }

    /// Load the snapshot, using its own identifiers as the objects to place
    pub fn load_tree(&self) -> Result<(FileSystem<String>, bool), ApiError> {
        let store = FileSnapshotStore::new(&self.snapshot_path);
        let objects: Vec<String> = match Snapshot::read(&store) {
            Ok(Some(snapshot)) => snapshot
                .data
                .into_iter()
                .map(|(identifier, _)| identifier)
                .collect(),
            Ok(None) => Vec::new(),
            Err(e) if e.is_malformed_document() => {
                warn!(error = %e, "Snapshot is malformed");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut fs = FileSystem::new();
        let changed = fs.load(&store, objects, String::clone, String::clone)?;
        Ok((fs, changed))
    }

    /// Write the tree back to the snapshot
    pub fn save_tree(&self, fs: &FileSystem<String>) -> Result<(), ApiError> {
        let store = FileSnapshotStore::new(&self.snapshot_path);
        fs.save(
            &store,
            |identifier, _| (identifier.clone(), true),
            self.config.storage.include_empty_folders,
        )?;
        info!(snapshot = %self.snapshot_path.display(), "Snapshot saved");
        Ok(())
    }
}

/// Move `source` into the existing folder `to`, or to the new full path `to`.
fn move_path(fs: &mut FileSystem<String>, source: NodeId, to: &str) -> Result<Outcome, ApiError> {
    if let Some(target) = fs.find(to) {
        if fs.node(target)?.is_folder() {
            return Ok(fs.move_to(source, target)?);
        }
        return Err(FsError::ItemExists(to.to_string()).into());
    }

    let (dirs, name) = split_path(to).ok_or_else(|| ApiError::PathNotFound(to.to_string()))?;
    let parent_path = dirs.join("/");
    let parent = fs
        .find(&parent_path)
        .ok_or_else(|| ApiError::PathNotFound(parent_path.clone()))?;
    Ok(fs.move_and_rename(source, parent, &name)?)
}
