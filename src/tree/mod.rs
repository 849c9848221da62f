//! Virtual Folder Tree
//!
//! An in-memory hierarchy of folders and typed leaves. Nodes live in an arena
//! owned by [`FileSystem`]; parents own their children by handle and every
//! node keeps a back-reference to its parent.

pub mod events;
pub mod node;
pub mod path;
pub mod sort;
pub mod walker;

pub use events::{ChangeKind, FsChange};
pub use node::{Folder, Identifier, Leaf, Node, NodeId, NodeKind, ROOT_DEPTH, ROOT_IDENTIFIER};
pub use sort::SortMode;
pub use walker::{Children, Descendants};

use crate::error::FsError;
use events::Listeners;
use path::{fix_duplicate_name, fix_name};
use tracing::{debug, instrument};

/// Result code of a structural operation that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The tree changed as requested
    Success,
    /// The tree already matched the request; nothing changed
    SuccessNothingDone,
    /// Some of the work was done; conflicting items were left in place
    PartialSuccess,
}

/// The tree: root folder, node arena and identifier counter
#[derive(Debug)]
pub struct FileSystem<T> {
    nodes: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    next_identifier: Identifier,
    listeners: Listeners,
}

impl<T> Default for FileSystem<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Node and leaf count contributed by a subtree
fn subtree_counts<T>(node: &Node<T>) -> (usize, usize) {
    match &node.kind {
        NodeKind::Folder(folder) => (1 + folder.total_descendants, folder.total_leaves),
        NodeKind::Leaf(_) => (1, 1),
    }
}

impl<T> FileSystem<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::root())],
            free: Vec::new(),
            next_identifier: ROOT_IDENTIFIER + 1,
            listeners: Listeners::default(),
        }
    }

    /// Drop every node below the root and restart identifiers at 1
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.push(Some(Node::root()));
        self.free.clear();
        self.next_identifier = ROOT_IDENTIFIER + 1;
    }

    /// Handle of the root folder
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Look up a node; `None` for unknown or stale handles
    pub fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes
            .get(id.slot)?
            .as_ref()
            .filter(|node| node.identifier == id.identifier)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node<T>, FsError> {
        self.get(id).ok_or(FsError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<T>, FsError> {
        self.nodes
            .get_mut(id.slot)
            .and_then(Option::as_mut)
            .filter(|node| node.identifier == id.identifier)
            .ok_or(FsError::NodeNotFound(id))
    }

    pub fn folder(&self, id: NodeId) -> Result<&Folder, FsError> {
        self.node(id)?.as_folder().ok_or(FsError::NotAFolder(id))
    }

    fn folder_mut(&mut self, id: NodeId) -> Result<&mut Folder, FsError> {
        self.node_mut(id)?
            .as_folder_mut()
            .ok_or(FsError::NotAFolder(id))
    }

    /// Payload of a leaf
    pub fn value(&self, id: NodeId) -> Option<&T> {
        self.get(id).and_then(Node::value)
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// True when the root has no children
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    pub fn total_descendants(&self) -> usize {
        self.folder(NodeId::ROOT)
            .map_or(0, |root| root.total_descendants)
    }

    pub fn total_leaves(&self) -> usize {
        self.folder(NodeId::ROOT).map_or(0, |root| root.total_leaves)
    }

    /// The identifier the next created node will receive
    pub fn next_identifier(&self) -> Identifier {
        self.next_identifier
    }

    /// Register a callback invoked after every structural change
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&FsChange) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn emit(&mut self, change: FsChange) {
        self.listeners.emit(change);
    }

    /// Run `f` with notifications switched off
    pub(crate) fn muted<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let listeners = std::mem::take(&mut self.listeners);
        let result = f(self);
        self.listeners = listeners;
        result
    }

    /// `/`-joined names from below the root down to the node
    pub fn full_path(&self, id: NodeId) -> Result<String, FsError> {
        let mut names = Vec::new();
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            names.push(current.name.as_str());
            current = self.node(parent)?;
        }
        names.reverse();
        Ok(path::join_path(names))
    }

    /// Resolve a `/`-separated path; the empty path is the root
    pub fn find(&self, path: &str) -> Option<NodeId> {
        path::folder_segments(path)
            .iter()
            .try_fold(NodeId::ROOT, |current, segment| {
                self.find_child(current, segment)
            })
    }

    /// Direct child of `folder` with exactly this (normalized) name
    pub fn find_child(&self, folder: NodeId, name: &str) -> Option<NodeId> {
        let folder = self.folder(folder).ok()?;
        let name = fix_name(name);
        self.search(folder, &name)
            .ok()
            .map(|position| folder.children[position])
    }

    pub fn children(&self, folder: NodeId, mode: SortMode) -> Result<Children<'_, T>, FsError> {
        let folder = self.folder(folder)?;
        Ok(Children::new(self, &folder.children, mode))
    }

    pub fn descendants(
        &self,
        folder: NodeId,
        mode: SortMode,
    ) -> Result<Descendants<'_, T>, FsError> {
        let start = self.children(folder, mode)?;
        Ok(Descendants::new(self, start, mode))
    }

    /// Create a folder; fails if any child of that name exists
    #[instrument(skip(self), level = "debug")]
    pub fn create_folder(&mut self, parent: NodeId, name: &str) -> Result<NodeId, FsError> {
        let name = valid_name(name)?;
        self.ensure_free_name(parent, &name)?;
        let identifier = self.take_identifier()?;
        let id = self.alloc(Node::new_folder(name, identifier));
        self.insert_child(parent, id)?;
        debug!(folder = %id, parent = %parent, "Created folder");
        self.emit(FsChange::new(ChangeKind::FolderAdded, id, None, Some(parent)));
        Ok(id)
    }

    /// Return the existing folder of that name, or create it
    ///
    /// An existing leaf of the same name is an `ItemExists` error.
    pub fn find_or_create_folder(
        &mut self,
        parent: NodeId,
        name: &str,
    ) -> Result<(Outcome, NodeId), FsError> {
        let name = valid_name(name)?;
        match self.find_child(parent, &name) {
            Some(existing) if self.node(existing)?.is_folder() => {
                Ok((Outcome::SuccessNothingDone, existing))
            }
            Some(_) => Err(FsError::ItemExists(name)),
            None => Ok((Outcome::Success, self.create_folder(parent, &name)?)),
        }
    }

    /// Create every folder along `path`, reusing existing ones
    pub fn create_all_folders(&mut self, path: &str) -> Result<(Outcome, NodeId), FsError> {
        let segments = path::folder_segments(path);
        self.create_folder_chain(&segments)
    }

    pub(crate) fn create_folder_chain<S: AsRef<str>>(
        &mut self,
        segments: &[S],
    ) -> Result<(Outcome, NodeId), FsError> {
        let mut outcome = Outcome::SuccessNothingDone;
        let mut current = NodeId::ROOT;
        for segment in segments {
            let (step, folder) = self.find_or_create_folder(current, segment.as_ref())?;
            if step == Outcome::Success {
                outcome = Outcome::Success;
            }
            current = folder;
        }
        Ok((outcome, current))
    }

    /// Create a leaf; fails if any child of that name exists
    #[instrument(skip(self, value), level = "debug")]
    pub fn create_leaf(&mut self, parent: NodeId, name: &str, value: T) -> Result<NodeId, FsError> {
        let name = valid_name(name)?;
        self.ensure_free_name(parent, &name)?;
        let identifier = self.take_identifier()?;
        let id = self.alloc(Node::new_leaf(name, identifier, value));
        self.insert_child(parent, id)?;
        debug!(leaf = %id, parent = %parent, "Created leaf");
        self.emit(FsChange::new(ChangeKind::LeafAdded, id, None, Some(parent)));
        Ok(id)
    }

    /// Create a leaf, suffixing the name until it no longer collides
    ///
    /// Returns the new handle and whether the name had to change.
    pub fn create_duplicate_leaf(
        &mut self,
        parent: NodeId,
        name: &str,
        value: T,
    ) -> Result<(NodeId, bool), FsError> {
        let mut name = valid_name(name)?;
        self.folder(parent)?;
        let mut renamed = false;
        while self.find_child(parent, &name).is_some() {
            name = fix_duplicate_name(&name);
            renamed = true;
        }
        if renamed {
            debug!(name = %name, "Resolved duplicate leaf name");
        }
        Ok((self.create_leaf(parent, &name, value)?, renamed))
    }

    #[instrument(skip(self), level = "debug")]
    pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<Outcome, FsError> {
        let new_name = valid_name(new_name)?;
        let node = self.node(id)?;
        let parent = node
            .parent
            .ok_or_else(|| FsError::InvalidOperation("the root folder cannot be renamed".into()))?;
        if node.name == new_name {
            return Ok(Outcome::SuccessNothingDone);
        }
        self.ensure_free_name(parent, &new_name)?;

        self.node_mut(id)?.name = new_name;
        self.reposition(parent, id)?;
        self.emit(FsChange::new(
            ChangeKind::ObjectRenamed,
            id,
            Some(parent),
            Some(parent),
        ));
        Ok(Outcome::Success)
    }

    /// Rename, suffixing the name until it no longer collides
    pub fn rename_with_duplicates(
        &mut self,
        id: NodeId,
        new_name: &str,
    ) -> Result<Outcome, FsError> {
        let mut candidate = valid_name(new_name)?;
        loop {
            match self.rename(id, &candidate) {
                Err(FsError::ItemExists(_)) => candidate = fix_duplicate_name(&candidate),
                result => return result,
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    pub fn move_to(&mut self, id: NodeId, new_parent: NodeId) -> Result<Outcome, FsError> {
        self.check_movable(id, new_parent)?;
        let node = self.node(id)?;
        if node.parent == Some(new_parent) {
            return Ok(Outcome::SuccessNothingDone);
        }
        let name = node.name.clone();
        self.ensure_free_name(new_parent, &name)?;

        let old_parent = self.detach(id)?;
        self.insert_child(new_parent, id)?;
        self.emit(FsChange::new(
            ChangeKind::ObjectMoved,
            id,
            Some(old_parent),
            Some(new_parent),
        ));
        Ok(Outcome::Success)
    }

    /// Move to `new_parent` and take `new_name` in one step
    pub fn move_and_rename(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        new_name: &str,
    ) -> Result<Outcome, FsError> {
        let new_name = valid_name(new_name)?;
        self.check_movable(id, new_parent)?;
        if self.node(id)?.parent == Some(new_parent) {
            return self.rename(id, &new_name);
        }
        self.ensure_free_name(new_parent, &new_name)?;

        let old_parent = self.detach(id)?;
        self.node_mut(id)?.name = new_name;
        self.insert_child(new_parent, id)?;
        self.emit(FsChange::new(
            ChangeKind::ObjectMoved,
            id,
            Some(old_parent),
            Some(new_parent),
        ));
        Ok(Outcome::Success)
    }

    /// Move every child of `from` into `to`
    ///
    /// Children whose name already exists in `to` stay behind and the result
    /// is `PartialSuccess`. A fully emptied `from` folder is removed.
    #[instrument(skip(self), level = "debug")]
    pub fn merge(&mut self, from: NodeId, to: NodeId) -> Result<Outcome, FsError> {
        if from == to {
            return Ok(Outcome::SuccessNothingDone);
        }
        let children = self.folder(from)?.children.clone();
        self.folder(to)?;
        if self.is_ancestor(from, to) {
            return Err(FsError::CircularReference(self.full_path(from)?));
        }

        let previous_parent = self.node(from)?.parent;
        let mut conflicts = 0usize;
        for child in children {
            let name = self.node(child)?.name.clone();
            if self.find_child(to, &name).is_some() {
                conflicts += 1;
                continue;
            }
            self.detach(child)?;
            self.insert_child(to, child)?;
        }

        if conflicts > 0 {
            debug!(from = %from, to = %to, conflicts, "Partial merge");
            self.emit(FsChange::new(
                ChangeKind::PartialMerge,
                from,
                previous_parent,
                Some(to),
            ));
            return Ok(Outcome::PartialSuccess);
        }

        if !from.is_root() {
            self.remove_subtree(from)?;
        }
        self.emit(FsChange::new(
            ChangeKind::FolderMerged,
            from,
            previous_parent,
            Some(to),
        ));
        Ok(Outcome::Success)
    }

    /// Detach and free a node with its whole subtree
    ///
    /// Returns the number of nodes removed.
    #[instrument(skip(self), level = "debug")]
    pub fn remove(&mut self, id: NodeId) -> Result<usize, FsError> {
        if id.is_root() {
            return Err(FsError::InvalidOperation(
                "the root folder cannot be removed".into(),
            ));
        }
        let parent = self.node(id)?.parent;
        let removed = self.remove_subtree(id)?;
        debug!(node = %id, removed, "Removed subtree");
        self.emit(FsChange::new(ChangeKind::ObjectRemoved, id, parent, None));
        Ok(removed)
    }

    fn remove_subtree(&mut self, id: NodeId) -> Result<usize, FsError> {
        self.detach(id)?;
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.node(current)?;
            if let Some(Node {
                kind: NodeKind::Folder(folder),
                ..
            }) = self.nodes[current.slot].take()
            {
                stack.extend(folder.children);
            }
            self.free.push(current.slot);
            removed += 1;
        }
        Ok(removed)
    }

    fn check_movable(&self, id: NodeId, new_parent: NodeId) -> Result<(), FsError> {
        if id.is_root() {
            return Err(FsError::InvalidOperation(
                "the root folder cannot be moved".into(),
            ));
        }
        self.node(id)?;
        self.folder(new_parent)?;
        if self.is_ancestor(id, new_parent) {
            return Err(FsError::CircularReference(self.full_path(id)?));
        }
        Ok(())
    }

    /// True if `ancestor` is `node` or lies on its parent chain
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    fn ensure_free_name(&self, parent: NodeId, name: &str) -> Result<(), FsError> {
        let folder = self.folder(parent)?;
        match self.search(folder, name) {
            Ok(_) => Err(FsError::ItemExists(name.to_string())),
            Err(_) => Ok(()),
        }
    }

    fn search(&self, folder: &Folder, name: &str) -> Result<usize, usize> {
        folder.children.binary_search_by(|child| {
            self.get(*child)
                .map_or("", |node| node.name.as_str())
                .cmp(name)
        })
    }

    fn take_identifier(&mut self) -> Result<Identifier, FsError> {
        let identifier = self.next_identifier;
        self.next_identifier = identifier
            .checked_add(1)
            .ok_or_else(|| FsError::InvalidOperation("identifier space exhausted".into()))?;
        Ok(identifier)
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        let identifier = node.identifier;
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        NodeId::new(slot, identifier)
    }

    /// Insert a detached node into `parent` at its sorted position
    fn insert_child(&mut self, parent: NodeId, child: NodeId) -> Result<usize, FsError> {
        let parent_depth = self.node(parent)?.depth;
        let node = self.node(child)?;
        let counts = subtree_counts(node);
        let name = node.name.clone();

        let position = match self.search(self.folder(parent)?, &name) {
            Ok(_) => return Err(FsError::ItemExists(name)),
            Err(position) => position,
        };
        self.folder_mut(parent)?.children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
        self.reindex(parent, position)?;
        self.set_depth(child, parent_depth + 1)?;
        self.grow_counters(parent, counts);
        Ok(position)
    }

    /// Remove a node from its parent's children; returns the old parent
    fn detach(&mut self, child: NodeId) -> Result<NodeId, FsError> {
        let node = self.node(child)?;
        let parent = node
            .parent
            .ok_or_else(|| FsError::InvalidOperation("the root folder cannot be detached".into()))?;
        let counts = subtree_counts(node);

        let position = self.position_in(parent, child)?;
        self.folder_mut(parent)?.children.remove(position);
        self.reindex(parent, position)?;
        self.shrink_counters(parent, counts);
        self.node_mut(child)?.parent = None;
        Ok(parent)
    }

    /// Move a renamed child to its new sorted position
    fn reposition(&mut self, parent: NodeId, child: NodeId) -> Result<(), FsError> {
        let old = self.position_in(parent, child)?;
        self.folder_mut(parent)?.children.remove(old);
        let name = self.node(child)?.name.clone();
        let position = match self.search(self.folder(parent)?, &name) {
            Ok(position) | Err(position) => position,
        };
        self.folder_mut(parent)?.children.insert(position, child);
        self.reindex(parent, old.min(position))
    }

    fn position_in(&self, parent: NodeId, child: NodeId) -> Result<usize, FsError> {
        let folder = self.folder(parent)?;
        let index = self.node(child)?.index;
        if folder.children.get(index) == Some(&child) {
            return Ok(index);
        }
        folder
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or(FsError::NodeNotFound(child))
    }

    fn reindex(&mut self, parent: NodeId, from: usize) -> Result<(), FsError> {
        let ids = self
            .folder(parent)?
            .children
            .get(from..)
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default();
        for (offset, id) in ids.into_iter().enumerate() {
            self.node_mut(id)?.index = from + offset;
        }
        Ok(())
    }

    /// Set a node's depth and propagate through its subtree when it changed
    fn set_depth(&mut self, id: NodeId, depth: i32) -> Result<(), FsError> {
        let mut stack = vec![(id, depth)];
        while let Some((current, depth)) = stack.pop() {
            let node = self.node_mut(current)?;
            if node.depth == depth {
                continue;
            }
            node.depth = depth;
            if let Some(folder) = node.as_folder() {
                stack.extend(folder.children.iter().map(|child| (*child, depth + 1)));
            }
        }
        Ok(())
    }

    fn grow_counters(&mut self, start: NodeId, (descendants, leaves): (usize, usize)) {
        let mut current = Some(start);
        while let Some(id) = current {
            let Ok(node) = self.node_mut(id) else { break };
            if let Some(folder) = node.as_folder_mut() {
                folder.total_descendants += descendants;
                folder.total_leaves += leaves;
            }
            current = node.parent;
        }
    }

    fn shrink_counters(&mut self, start: NodeId, (descendants, leaves): (usize, usize)) {
        let mut current = Some(start);
        while let Some(id) = current {
            let Ok(node) = self.node_mut(id) else { break };
            if let Some(folder) = node.as_folder_mut() {
                folder.total_descendants = folder.total_descendants.saturating_sub(descendants);
                folder.total_leaves = folder.total_leaves.saturating_sub(leaves);
            }
            current = node.parent;
        }
    }
}

fn valid_name(name: &str) -> Result<String, FsError> {
    let fixed = fix_name(name);
    if fixed.is_empty() {
        return Err(FsError::InvalidName(name.to_string()));
    }
    Ok(fixed)
}
