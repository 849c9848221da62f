//! Change notifications emitted after structural mutations

use crate::tree::node::NodeId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    ObjectRenamed,
    ObjectRemoved,
    FolderAdded,
    LeafAdded,
    ObjectMoved,
    FolderMerged,
    PartialMerge,
    Reload,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::ObjectRenamed => "renamed",
            ChangeKind::ObjectRemoved => "removed",
            ChangeKind::FolderAdded => "folder-added",
            ChangeKind::LeafAdded => "leaf-added",
            ChangeKind::ObjectMoved => "moved",
            ChangeKind::FolderMerged => "merged",
            ChangeKind::PartialMerge => "partially-merged",
            ChangeKind::Reload => "reload",
        };
        f.write_str(label)
    }
}

/// A single structural change
///
/// `node` may refer to a node that no longer exists (for removals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsChange {
    pub kind: ChangeKind,
    pub node: NodeId,
    pub previous_parent: Option<NodeId>,
    pub new_parent: Option<NodeId>,
}

impl FsChange {
    pub fn new(
        kind: ChangeKind,
        node: NodeId,
        previous_parent: Option<NodeId>,
        new_parent: Option<NodeId>,
    ) -> Self {
        Self {
            kind,
            node,
            previous_parent,
            new_parent,
        }
    }
}

pub type ChangeListener = Box<dyn FnMut(&FsChange)>;

/// Registered listeners, invoked in subscription order
#[derive(Default)]
pub(crate) struct Listeners {
    listeners: Vec<ChangeListener>,
}

impl Listeners {
    pub(crate) fn push(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    pub(crate) fn emit(&mut self, change: FsChange) {
        tracing::trace!(kind = %change.kind, node = %change.node, "Tree change");
        for listener in &mut self.listeners {
            listener(&change);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
