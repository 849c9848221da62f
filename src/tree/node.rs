//! Node types shared by folders and leaves

use std::fmt;

/// Tree-unique identifier assigned to a node at creation
pub type Identifier = u32;

/// Identifier reserved for the root folder; never drawn from the counter.
pub const ROOT_IDENTIFIER: Identifier = 0;

/// Depth of the root folder. Its direct children sit at depth 0.
pub const ROOT_DEPTH: i32 = -1;

/// Handle to a node stored in a [`FileSystem`](crate::tree::FileSystem) arena
///
/// Carries the node's identifier alongside the arena slot, so a handle to a
/// removed node is rejected even after its slot has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) slot: usize,
    pub(crate) identifier: Identifier,
}

impl NodeId {
    /// Handle of the root folder
    pub const ROOT: NodeId = NodeId {
        slot: 0,
        identifier: ROOT_IDENTIFIER,
    };

    pub(crate) const fn new(slot: usize, identifier: Identifier) -> Self {
        NodeId { slot, identifier }
    }

    /// The identifier of the node this handle points to
    pub const fn identifier(self) -> Identifier {
        self.identifier
    }

    pub const fn is_root(self) -> bool {
        self.slot == 0 && self.identifier == ROOT_IDENTIFIER
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.identifier)
    }
}

/// Folder payload: ordered children plus aggregate counters
#[derive(Debug, Clone, Default)]
pub struct Folder {
    pub(crate) children: Vec<NodeId>,
    pub(crate) total_descendants: usize,
    pub(crate) total_leaves: usize,
}

impl Folder {
    /// Direct children in storage order (sorted by name)
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Recursive count of every node below this folder
    pub fn total_descendants(&self) -> usize {
        self.total_descendants
    }

    /// Recursive count of leaves below this folder
    pub fn total_leaves(&self) -> usize {
        self.total_leaves
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Leaf payload: a single value owned by the tree
#[derive(Debug, Clone)]
pub struct Leaf<T> {
    pub(crate) value: T,
}

impl<T> Leaf<T> {
    pub fn value(&self) -> &T {
        &self.value
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind<T> {
    Folder(Folder),
    Leaf(Leaf<T>),
}

/// A single node in the hierarchy
///
/// The path-node fields (name, identifier, parent, depth, index) are shared by
/// both kinds. Only [`FileSystem`](crate::tree::FileSystem) mutates them.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub(crate) name: String,
    pub(crate) identifier: Identifier,
    pub(crate) parent: Option<NodeId>,
    pub(crate) depth: i32,
    pub(crate) index: usize,
    pub(crate) kind: NodeKind<T>,
}

impl<T> Node<T> {
    pub(crate) fn root() -> Self {
        Node {
            name: String::new(),
            identifier: ROOT_IDENTIFIER,
            parent: None,
            depth: ROOT_DEPTH,
            index: 0,
            kind: NodeKind::Folder(Folder::default()),
        }
    }

    pub(crate) fn new_folder(name: String, identifier: Identifier) -> Self {
        Node {
            name,
            identifier,
            parent: None,
            depth: 0,
            index: 0,
            kind: NodeKind::Folder(Folder::default()),
        }
    }

    pub(crate) fn new_leaf(name: String, identifier: Identifier, value: T) -> Self {
        Node {
            name,
            identifier,
            parent: None,
            depth: 0,
            index: 0,
            kind: NodeKind::Leaf(Leaf { value }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> Identifier {
        self.identifier
    }

    /// Parent folder handle; `None` only for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Position within the parent's child collection
    pub fn index_in_parent(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> &NodeKind<T> {
        &self.kind
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match &self.kind {
            NodeKind::Folder(folder) => Some(folder),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn as_folder_mut(&mut self) -> Option<&mut Folder> {
        match &mut self.kind {
            NodeKind::Folder(folder) => Some(folder),
            NodeKind::Leaf(_) => None,
        }
    }

    /// The payload of a leaf; `None` for folders
    pub fn value(&self) -> Option<&T> {
        match &self.kind {
            NodeKind::Leaf(leaf) => Some(&leaf.value),
            NodeKind::Folder(_) => None,
        }
    }
}
