//! Snapshot document and the tree's save/load protocol
//!
//! The persisted document maps identifiers to full leaf paths and optionally
//! lists empty folders, which have no leaf to anchor them:
//!
//! ```json
//! {
//!   "Data": { "<identifier>": "<full/path/to/leaf>" },
//!   "EmptyFolders": ["<full/path/to/empty/folder>"]
//! }
//! ```

use crate::error::StorageError;
use crate::store::{FileSnapshotStore, SnapshotStore};
use crate::tree::path::{self, fix_name};
use crate::tree::{ChangeKind, FileSystem, FsChange, NodeId, NodeKind, SortMode};
use serde::de::Error as _;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

const DATA_FIELD: &str = "Data";
const EMPTY_FOLDERS_FIELD: &str = "EmptyFolders";

/// Name given to a new leaf when neither its display name nor its identifier
/// yields a usable segment
const FALLBACK_NAME: &str = "Unnamed";

/// Flat persisted form of a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Identifier → full path, in traversal order
    #[serde(rename = "Data", serialize_with = "serialize_entries")]
    pub data: Vec<(String, String)>,

    /// Full paths of empty folders; `None` when not requested
    #[serde(rename = "EmptyFolders", skip_serializing_if = "Option::is_none")]
    pub empty_folders: Option<Vec<String>>,
}

fn serialize_entries<S: Serializer>(
    entries: &[(String, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|(key, value)| (key, value)))
}

impl Snapshot {
    /// Parse a persisted document
    ///
    /// Only an unparseable document or a non-object top level is an error.
    /// A missing or wrongly shaped field reads as empty, and non-string
    /// entries are skipped.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let document: Value = serde_json::from_str(text)?;
        let Value::Object(fields) = document else {
            return Err(serde_json::Error::custom(
                "snapshot document must be a JSON object",
            ));
        };

        let data = match fields.get(DATA_FIELD) {
            Some(Value::Object(entries)) => entries
                .iter()
                .filter_map(|(identifier, path)| {
                    path.as_str()
                        .map(|path| (identifier.clone(), path.to_string()))
                })
                .collect(),
            _ => Vec::new(),
        };

        let empty_folders = match fields.get(EMPTY_FOLDERS_FIELD) {
            Some(Value::Array(paths)) => Some(
                paths
                    .iter()
                    .filter_map(|path| path.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        };

        Ok(Self {
            data,
            empty_folders,
        })
    }

    /// Read and parse the document held by a store
    ///
    /// Returns `Ok(None)` when the store holds nothing.
    pub fn read<S: SnapshotStore + ?Sized>(store: &S) -> Result<Option<Self>, StorageError> {
        if !store.exists() {
            return Ok(None);
        }
        let text = store.read_to_string()?;
        Ok(Some(Self::parse(&text)?))
    }

    /// Write the document with indentation
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), StorageError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn to_string_pretty(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<T> FileSystem<T> {
    /// Build the persisted form of the tree
    ///
    /// `convert` maps each leaf payload and its full path to an identifier
    /// and a flag saying whether to write it at all.
    pub fn snapshot<F>(
        &self,
        mut convert: F,
        include_empty_folders: bool,
    ) -> Result<Snapshot, StorageError>
    where
        F: FnMut(&T, &str) -> (String, bool),
    {
        let mut data = Vec::new();
        let mut empty_folders = Vec::new();

        for (id, node) in self.descendants(NodeId::ROOT, SortMode::Lexicographical)? {
            match node.kind() {
                NodeKind::Folder(folder) => {
                    if include_empty_folders && folder.is_empty() {
                        empty_folders.push(self.full_path(id)?);
                    }
                }
                NodeKind::Leaf(leaf) => {
                    let full_path = self.full_path(id)?;
                    let (identifier, should_write) = convert(leaf.value(), &full_path);
                    if should_write {
                        data.push((identifier, full_path));
                    }
                }
            }
        }

        Ok(Snapshot {
            data,
            empty_folders: include_empty_folders.then_some(empty_folders),
        })
    }

    /// Persist the tree to `store`, replacing whatever it held
    #[instrument(skip_all, fields(destination = %store.describe()))]
    pub fn save<S, F>(
        &self,
        store: &S,
        convert: F,
        include_empty_folders: bool,
    ) -> Result<(), StorageError>
    where
        S: SnapshotStore + ?Sized,
        F: FnMut(&T, &str) -> (String, bool),
    {
        let start = Instant::now();
        let mut writer = store.create()?;
        let snapshot = self.snapshot(convert, include_empty_folders)?;
        snapshot.write_to(&mut writer)?;
        writer.flush()?;

        info!(
            entries = snapshot.data.len(),
            empty_folders = snapshot.empty_folders.as_ref().map_or(0, Vec::len),
            duration_ms = start.elapsed().as_millis() as u64,
            "Saved tree snapshot"
        );
        Ok(())
    }

    pub fn save_to_file<P, F>(
        &self,
        path: P,
        convert: F,
        include_empty_folders: bool,
    ) -> Result<(), StorageError>
    where
        P: AsRef<Path>,
        F: FnMut(&T, &str) -> (String, bool),
    {
        self.save(&FileSnapshotStore::new(path), convert, include_empty_folders)
    }

    /// Rebuild the tree from `store` and the caller's current objects
    ///
    /// Returns whether the rebuilt tree diverges from what was persisted and
    /// should be saved again. A missing resource is not an error and reports
    /// no change; a malformed document leaves the tree empty and reports a
    /// change. Failing to read an existing resource is an error.
    #[instrument(skip_all, fields(source = %store.describe()))]
    pub fn load<S, I, FI, FN>(
        &mut self,
        store: &S,
        objects: I,
        to_identifier: FI,
        to_name: FN,
    ) -> Result<bool, StorageError>
    where
        S: SnapshotStore + ?Sized,
        I: IntoIterator<Item = T>,
        FI: FnMut(&T) -> String,
        FN: FnMut(&T) -> String,
    {
        let start = Instant::now();
        self.reset();

        // Listeners only see the final reload, not every rebuilt node.
        let changed =
            self.muted(|fs| fs.load_inner(store, objects, to_identifier, to_name))?;

        info!(
            nodes = self.total_descendants(),
            leaves = self.total_leaves(),
            changed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Loaded tree snapshot"
        );
        self.emit(FsChange::new(ChangeKind::Reload, NodeId::ROOT, None, None));
        Ok(changed)
    }

    pub fn load_from_file<P, I, FI, FN>(
        &mut self,
        path: P,
        objects: I,
        to_identifier: FI,
        to_name: FN,
    ) -> Result<bool, StorageError>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = T>,
        FI: FnMut(&T) -> String,
        FN: FnMut(&T) -> String,
    {
        self.load(&FileSnapshotStore::new(path), objects, to_identifier, to_name)
    }

    fn load_inner<S, I, FI, FN>(
        &mut self,
        store: &S,
        objects: I,
        mut to_identifier: FI,
        mut to_name: FN,
    ) -> Result<bool, StorageError>
    where
        S: SnapshotStore + ?Sized,
        I: IntoIterator<Item = T>,
        FI: FnMut(&T) -> String,
        FN: FnMut(&T) -> String,
    {
        if !store.exists() {
            debug!("No snapshot to load");
            return Ok(false);
        }
        let snapshot = match Snapshot::read(store) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Ok(false),
            Err(e) if e.is_malformed_document() => {
                warn!(error = %e, "Malformed tree snapshot, starting from an empty tree");
                return Ok(true);
            }
            Err(e) => return Err(e),
        };

        let mut changed = false;
        let mut consumed: HashSet<String> = HashSet::new();
        let mut saved: HashMap<&str, &str> = snapshot
            .data
            .iter()
            .map(|(identifier, path)| (identifier.as_str(), path.as_str()))
            .collect();

        for value in objects {
            let identifier = to_identifier(&value);
            if consumed.contains(&identifier) {
                warn!(
                    identifier = %identifier,
                    "Skipping object whose saved entry was already used"
                );
                changed = true;
                continue;
            }
            match saved.remove(identifier.as_str()) {
                Some(saved_path) => {
                    consumed.insert(identifier.clone());
                    changed |= self.restore_leaf(saved_path, &identifier, value, &mut to_name);
                }
                None => {
                    let name = leaf_name(&to_name(&value), &identifier);
                    changed |= self.place_leaf(NodeId::ROOT, &name, value);
                }
            }
        }

        // Keep the folders of entries whose objects are gone, and the
        // explicitly listed empty folders.
        let remaining = snapshot
            .data
            .iter()
            .filter(|(identifier, _)| saved.contains_key(identifier.as_str()))
            .filter_map(|(_, saved_path)| path::split_path(saved_path).map(|(dirs, _)| dirs));
        let empty = snapshot
            .empty_folders
            .iter()
            .flatten()
            .map(|folder| path::folder_segments(folder));
        for segments in remaining.chain(empty).collect::<Vec<_>>() {
            if let Err(e) = self.create_folder_chain(&segments) {
                debug!(path = %path::join_path(&segments), error = %e, "Could not restore folder");
                changed = true;
            }
        }

        Ok(changed)
    }

    /// Place an object at its saved path; returns whether anything diverged
    fn restore_leaf<FN>(
        &mut self,
        saved_path: &str,
        identifier: &str,
        value: T,
        to_name: &mut FN,
    ) -> bool
    where
        FN: FnMut(&T) -> String,
    {
        let Some((dirs, name)) = path::split_path(saved_path) else {
            let name = leaf_name(&to_name(&value), identifier);
            self.place_leaf(NodeId::ROOT, &name, value);
            return true;
        };

        match self.create_folder_chain(&dirs) {
            Ok((_, folder)) => self.place_leaf(folder, &name, value),
            Err(e) => {
                warn!(
                    identifier,
                    path = saved_path,
                    error = %e,
                    "Skipping object with conflicting saved path"
                );
                true
            }
        }
    }

    /// Insert a leaf with duplicate resolution; returns whether it was renamed
    fn place_leaf(&mut self, folder: NodeId, name: &str, value: T) -> bool {
        match self.create_duplicate_leaf(folder, name, value) {
            Ok((_, renamed)) => {
                if renamed {
                    warn!(name, "Renamed duplicate entry while loading");
                }
                renamed
            }
            Err(e) => {
                warn!(name, error = %e, "Could not place object");
                true
            }
        }
    }
}

fn leaf_name(proposed: &str, identifier: &str) -> String {
    [proposed, identifier]
        .into_iter()
        .map(fix_name)
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}
