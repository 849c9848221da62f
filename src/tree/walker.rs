//! Ordered traversal over a folder's children and descendants

use crate::tree::node::{Node, NodeId};
use crate::tree::sort::SortMode;
use crate::tree::FileSystem;

#[derive(Debug, Clone, Copy)]
enum Pass {
    Folders,
    Leaves,
    All,
}

/// Lazy iterator over the direct children of one folder
///
/// Cloning the iterator, or asking the tree for a new one, restarts the
/// enumeration. The tree cannot be mutated while an iterator borrows it.
pub struct Children<'a, T> {
    fs: &'a FileSystem<T>,
    children: &'a [NodeId],
    passes: [Pass; 2],
    pass_count: usize,
    pass: usize,
    reverse: bool,
    cursor: usize,
}

impl<'a, T> Children<'a, T> {
    pub(crate) fn new(fs: &'a FileSystem<T>, children: &'a [NodeId], mode: SortMode) -> Self {
        // Inverse modes flip the group order and walk each group backwards.
        let (passes, pass_count, reverse) = match mode {
            SortMode::FoldersFirst => ([Pass::Folders, Pass::Leaves], 2, false),
            SortMode::FoldersLast => ([Pass::Leaves, Pass::Folders], 2, false),
            SortMode::Lexicographical => ([Pass::All, Pass::All], 1, false),
            SortMode::InverseFoldersFirst => ([Pass::Leaves, Pass::Folders], 2, true),
            SortMode::InverseFoldersLast => ([Pass::Folders, Pass::Leaves], 2, true),
            SortMode::InverseLexicographical => ([Pass::All, Pass::All], 1, true),
        };
        Self {
            fs,
            children,
            passes,
            pass_count,
            pass: 0,
            reverse,
            cursor: 0,
        }
    }

    fn accepts(&self, pass: Pass, node: &Node<T>) -> bool {
        match pass {
            Pass::All => true,
            Pass::Folders => node.is_folder(),
            Pass::Leaves => node.is_leaf(),
        }
    }
}

impl<T> Clone for Children<'_, T> {
    fn clone(&self) -> Self {
        Self {
            fs: self.fs,
            children: self.children,
            passes: self.passes,
            pass_count: self.pass_count,
            pass: self.pass,
            reverse: self.reverse,
            cursor: self.cursor,
        }
    }
}

impl<'a, T> Iterator for Children<'a, T> {
    type Item = (NodeId, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.children.len();
        while self.pass < self.pass_count {
            while self.cursor < len {
                let position = if self.reverse {
                    len - 1 - self.cursor
                } else {
                    self.cursor
                };
                self.cursor += 1;

                let id = self.children[position];
                if let Some(node) = self.fs.get(id) {
                    if self.accepts(self.passes[self.pass], node) {
                        return Some((id, node));
                    }
                }
            }
            self.pass += 1;
            self.cursor = 0;
        }
        None
    }
}

/// Lazy depth-first pre-order iterator over every node below a folder
///
/// Each folder is yielded before its contents. Uses an explicit stack of
/// [`Children`] iterators rather than recursion.
pub struct Descendants<'a, T> {
    fs: &'a FileSystem<T>,
    mode: SortMode,
    stack: Vec<Children<'a, T>>,
}

impl<'a, T> Descendants<'a, T> {
    pub(crate) fn new(fs: &'a FileSystem<T>, start: Children<'a, T>, mode: SortMode) -> Self {
        Self {
            fs,
            mode,
            stack: vec![start],
        }
    }
}

impl<T> Clone for Descendants<'_, T> {
    fn clone(&self) -> Self {
        Self {
            fs: self.fs,
            mode: self.mode,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, T> Iterator for Descendants<'a, T> {
    type Item = (NodeId, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some((id, node)) => {
                    if let Some(folder) = node.as_folder() {
                        self.stack
                            .push(Children::new(self.fs, folder.children(), self.mode));
                    }
                    return Some((id, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}
