//! The rooted tree and its mutation primitives.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FsError, FsResult};
use crate::path::{self, segments};
use crate::types::{DirEntry, FileType, SEPARATOR};

use super::node::Node;

/// How a directory walk treats a missing segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolve {
    /// A missing segment fails with `NotFound`.
    MustExist,
    /// A missing segment is created as an empty directory. Only journal
    /// replay walks this way.
    CreateMissing,
}

/// The whole namespace: a root directory named after the separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    root: Node,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            root: Node::new_dir(SEPARATOR),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// A tree is well formed when its root is a directory named `/`.
    pub fn is_well_formed(&self) -> bool {
        self.root.is_dir() && self.root.name() == SEPARATOR
    }

    /// Look up any node by absolute path
    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut cur = &self.root;
        for seg in segments(path) {
            cur = cur.children()?.get(seg)?;
        }
        Some(cur)
    }

    /// Walk to an existing directory
    pub fn dir(&self, path: &str) -> FsResult<&IndexMap<String, Node>> {
        self.get(path)
            .and_then(Node::children)
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    /// Walk to a directory for mutation. With [`Resolve::CreateMissing`],
    /// absent segments are created; a segment held by a file is never
    /// shadowed and fails with `NotFound`.
    pub fn dir_mut(
        &mut self,
        path: &str,
        resolve: Resolve,
    ) -> FsResult<&mut IndexMap<String, Node>> {
        let mut cur = &mut self.root;
        for seg in segments(path) {
            let children = match cur {
                Node::Dir { children, .. } => children,
                Node::File { .. } => return Err(FsError::NotFound(path.to_string())),
            };
            cur = match resolve {
                Resolve::MustExist => children
                    .get_mut(seg)
                    .ok_or_else(|| FsError::NotFound(path.to_string()))?,
                Resolve::CreateMissing => children.entry(seg.to_string()).or_insert_with(|| {
                    debug!(path, segment = seg, "creating missing intermediate directory");
                    Node::new_dir(seg)
                }),
            };
        }
        cur.children_mut()
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    /// Find a child of `parent` by name and kind
    pub fn lookup(&self, parent: &str, name: &str, kind: FileType) -> Option<&Node> {
        self.dir(parent)
            .ok()?
            .get(name)
            .filter(|node| node.file_type() == kind)
    }

    /// Attach `node` under `parent`. Names are unique per directory across
    /// both kinds.
    pub fn insert(&mut self, parent: &str, node: Node, resolve: Resolve) -> FsResult<()> {
        let children = self.dir_mut(parent, resolve)?;
        if children.contains_key(node.name()) {
            return Err(FsError::NameCollision(path::join(parent, node.name())));
        }
        children.insert(node.name().to_string(), node);
        Ok(())
    }

    /// Detach and return the child `name` of `parent` if it has the given kind
    pub fn remove(&mut self, parent: &str, name: &str, kind: FileType) -> FsResult<Node> {
        let not_found = || FsError::NotFound(path::join(parent, name));
        let children = self.dir_mut(parent, Resolve::MustExist)?;
        if !children.get(name).is_some_and(|node| node.file_type() == kind) {
            return Err(not_found());
        }
        children.shift_remove(name).ok_or_else(not_found)
    }

    /// Direct children of the directory at `path`
    pub fn list(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        Ok(self.dir(path)?.values().map(Node::to_entry).collect())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
