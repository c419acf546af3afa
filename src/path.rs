//! Absolute path splitting.
//!
//! Paths reaching the core are already absolute and carry no trailing
//! separator except for the root itself.

use crate::types::SEPARATOR;

/// An absolute path split into its parent directory and final component.
///
/// The root splits into the sentinel pair `("/", "/")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts<'a> {
    pub parent: &'a str,
    pub base: &'a str,
}

impl<'a> PathParts<'a> {
    pub fn of(path: &'a str) -> Self {
        if is_root(path) {
            return Self {
                parent: SEPARATOR,
                base: SEPARATOR,
            };
        }
        match path.rsplit_once('/') {
            Some(("", base)) => Self {
                parent: SEPARATOR,
                base,
            },
            Some((parent, base)) => Self { parent, base },
            None => Self {
                parent: SEPARATOR,
                base: path,
            },
        }
    }

    pub fn is_root(&self) -> bool {
        self.base == SEPARATOR
    }
}

pub fn is_root(path: &str) -> bool {
    path.is_empty() || path == SEPARATOR
}

/// Non-empty components of `path`, root first.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// True if `path` names `ancestor` itself or something below it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if is_root(ancestor) {
        return true;
    }
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Join a directory path and a child name.
pub fn join(parent: &str, name: &str) -> String {
    if is_root(parent) {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}
