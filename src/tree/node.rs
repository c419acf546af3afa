//! Node representation for the in-memory tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::types::{DirEntry, FileType};

/// Tree node - either a file or a directory owning its children
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    File {
        name: String,
        content: String,
        #[serde(with = "serde_millis")]
        created_at: SystemTime,
    },
    Dir {
        name: String,
        #[serde(with = "serde_millis")]
        created_at: SystemTime,
        children: IndexMap<String, Node>,
    },
}

impl Node {
    /// Create a new file with the given content
    pub fn new_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Node::File {
            name: name.into(),
            content: content.into(),
            created_at: SystemTime::now(),
        }
    }

    /// Create a new empty directory
    pub fn new_dir(name: impl Into<String>) -> Self {
        Node::Dir {
            name: name.into(),
            created_at: SystemTime::now(),
            children: IndexMap::new(),
        }
    }

    /// Check if this node is a file
    pub fn is_file(&self) -> bool {
        matches!(self, Node::File { .. })
    }

    /// Check if this node is a directory
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Dir { .. })
    }

    pub fn file_type(&self) -> FileType {
        match self {
            Node::File { .. } => FileType::File,
            Node::Dir { .. } => FileType::Dir,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File { name, .. } | Node::Dir { name, .. } => name,
        }
    }

    pub fn set_name(&mut self, new_name: impl Into<String>) {
        match self {
            Node::File { name, .. } | Node::Dir { name, .. } => *name = new_name.into(),
        }
    }

    pub fn created_at(&self) -> SystemTime {
        match self {
            Node::File { created_at, .. } | Node::Dir { created_at, .. } => *created_at,
        }
    }

    /// Get file size in bytes (0 for directories)
    pub fn size(&self) -> u64 {
        match self {
            Node::File { content, .. } => content.len() as u64,
            Node::Dir { .. } => 0,
        }
    }

    /// File content, `None` for directories
    pub fn content(&self) -> Option<&str> {
        match self {
            Node::File { content, .. } => Some(content),
            Node::Dir { .. } => None,
        }
    }

    pub fn children(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Dir { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut IndexMap<String, Node>> {
        match self {
            Node::Dir { children, .. } => Some(children),
            Node::File { .. } => None,
        }
    }

    /// True for a directory without children; files are never empty directories
    pub fn is_empty_dir(&self) -> bool {
        self.children().is_some_and(IndexMap::is_empty)
    }

    /// Recursively duplicate this subtree. The copy shares nothing with `self`
    /// and every copied node gets a fresh creation time.
    pub fn deep_copy(&self) -> Node {
        match self {
            Node::File { name, content, .. } => Node::new_file(name.clone(), content.clone()),
            Node::Dir { name, children, .. } => Node::Dir {
                name: name.clone(),
                created_at: SystemTime::now(),
                children: children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.deep_copy()))
                    .collect(),
            },
        }
    }

    pub fn to_entry(&self) -> DirEntry {
        DirEntry {
            name: self.name().to_string(),
            file_type: self.file_type(),
            size: self.size(),
            created_at: self.created_at(),
        }
    }
}

/// Nodes compare by name, kind and content at every level. Creation times are
/// not part of equality.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Node::File { name, content, .. },
                Node::File {
                    name: other_name,
                    content: other_content,
                    ..
                },
            ) => name == other_name && content == other_content,
            (
                Node::Dir { name, children, .. },
                Node::Dir {
                    name: other_name,
                    children: other_children,
                    ..
                },
            ) => name == other_name && children == other_children,
            _ => false,
        }
    }
}

impl Eq for Node {}
