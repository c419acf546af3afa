//! The closed set of journaled mutations and the single dispatcher that
//! applies them to a [`Tree`], both for foreground calls and for replay.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{FsError, FsResult};
use crate::journal::JournalEntry;
use crate::path::{self, PathParts};
use crate::tree::{Node, Resolve, Tree};
use crate::types::{FileType, OpKind};

/// How preconditions are enforced while applying an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A caller-issued command: parents must exist and every failed
    /// precondition is an error.
    Foreground,
    /// Replay of a pending journal entry: missing destination parents are
    /// created and preconditions that show the work is already done (or can
    /// never be done) are treated as no-ops.
    Replay,
}

impl Mode {
    fn resolve(self) -> Resolve {
        match self {
            Mode::Foreground => Resolve::MustExist,
            Mode::Replay => Resolve::CreateMissing,
        }
    }

    fn tolerate(self, err: FsError) -> FsResult<()> {
        match self {
            Mode::Foreground => Err(err),
            Mode::Replay => {
                debug!(reason = %err, "replay precondition not met, skipping");
                Ok(())
            }
        }
    }

    fn tolerate_collision(self, result: FsResult<()>) -> FsResult<()> {
        match result {
            Err(err @ FsError::NameCollision(_)) => self.tolerate(err),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateDirectory { path: String },
    RemoveDirectory { path: String },
    CreateFile { path: String },
    DeleteFile { path: String },
    Write { path: String, content: String },
    Copy { src: String, dest: String },
    Rename { src: String, dest: String },
}

impl Operation {
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::CreateDirectory { .. } => OpKind::Mkdir,
            Operation::RemoveDirectory { .. } => OpKind::Rmdir,
            Operation::CreateFile { .. } => OpKind::Touch,
            Operation::DeleteFile { .. } => OpKind::Rm,
            Operation::Write { .. } => OpKind::Write,
            Operation::Copy { .. } => OpKind::Cp,
            Operation::Rename { .. } => OpKind::Mv,
        }
    }

    /// Parameters as recorded in the journal
    pub fn params(&self) -> BTreeMap<String, String> {
        let pairs: Vec<(&str, &str)> = match self {
            Operation::CreateDirectory { path }
            | Operation::RemoveDirectory { path }
            | Operation::CreateFile { path }
            | Operation::DeleteFile { path } => vec![("path", path.as_str())],
            Operation::Write { path, content } => {
                vec![("path", path.as_str()), ("content", content.as_str())]
            }
            Operation::Copy { src, dest } | Operation::Rename { src, dest } => {
                vec![("src", src.as_str()), ("dest", dest.as_str())]
            }
        };
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Rebuild the operation a journal entry describes.
    pub fn from_entry(entry: &JournalEntry) -> FsResult<Self> {
        let param = |key: &str| {
            entry.params.get(key).cloned().ok_or_else(|| {
                FsError::Argument(format!("journal entry {} has no `{}`", entry.id, key))
            })
        };

        Ok(match entry.kind()? {
            OpKind::Mkdir => Operation::CreateDirectory {
                path: param("path")?,
            },
            OpKind::Rmdir => Operation::RemoveDirectory {
                path: param("path")?,
            },
            OpKind::Touch => Operation::CreateFile {
                path: param("path")?,
            },
            OpKind::Rm => Operation::DeleteFile {
                path: param("path")?,
            },
            OpKind::Write => Operation::Write {
                path: param("path")?,
                content: param("content")?,
            },
            OpKind::Cp => Operation::Copy {
                src: param("src")?,
                dest: param("dest")?,
            },
            OpKind::Mv => Operation::Rename {
                src: param("src")?,
                dest: param("dest")?,
            },
        })
    }

    /// Apply this mutation to `tree`. Preconditions are checked before the
    /// tree is touched, so a foreground failure leaves the tree unchanged.
    pub fn apply(&self, tree: &mut Tree, mode: Mode) -> FsResult<()> {
        match self {
            Operation::CreateDirectory { path } => create(tree, path, mode, Node::new_dir),
            Operation::RemoveDirectory { path } => remove_directory(tree, path, mode),
            Operation::CreateFile { path } => {
                create(tree, path, mode, |name| Node::new_file(name, ""))
            }
            Operation::DeleteFile { path } => delete_file(tree, path, mode),
            Operation::Write { path, content } => write(tree, path, content, mode),
            Operation::Copy { src, dest } => copy(tree, src, dest, mode),
            Operation::Rename { src, dest } => rename(tree, src, dest, mode),
        }
    }
}

fn create(
    tree: &mut Tree,
    path: &str,
    mode: Mode,
    make: impl FnOnce(String) -> Node,
) -> FsResult<()> {
    let parts = PathParts::of(path);
    if parts.is_root() {
        return mode.tolerate(FsError::NameCollision(path.to_string()));
    }
    let result = tree.insert(parts.parent, make(parts.base.to_string()), mode.resolve());
    mode.tolerate_collision(result)
}

fn remove_directory(tree: &mut Tree, path: &str, mode: Mode) -> FsResult<()> {
    let parts = PathParts::of(path);
    if parts.is_root() {
        return mode.tolerate(FsError::RootImmutable);
    }
    match tree.lookup(parts.parent, parts.base, FileType::Dir) {
        None => return mode.tolerate(FsError::NotFound(path.to_string())),
        Some(dir) if !dir.is_empty_dir() => {
            return mode.tolerate(FsError::NotEmpty(path.to_string()));
        }
        Some(_) => {}
    }
    tree.remove(parts.parent, parts.base, FileType::Dir)
        .map(drop)
}

fn delete_file(tree: &mut Tree, path: &str, mode: Mode) -> FsResult<()> {
    let parts = PathParts::of(path);
    if tree.lookup(parts.parent, parts.base, FileType::File).is_none() {
        return mode.tolerate(FsError::NotFound(path.to_string()));
    }
    tree.remove(parts.parent, parts.base, FileType::File)
        .map(drop)
}

/// Upsert: replace an existing file's content or create the file.
fn write(tree: &mut Tree, path: &str, content: &str, mode: Mode) -> FsResult<()> {
    let parts = PathParts::of(path);
    if parts.is_root() {
        return mode.tolerate(FsError::NameCollision(path.to_string()));
    }
    let children = tree.dir_mut(parts.parent, mode.resolve())?;
    match children.get_mut(parts.base) {
        Some(Node::File { content: existing, .. }) => {
            existing.clear();
            existing.push_str(content);
            Ok(())
        }
        Some(Node::Dir { .. }) => mode.tolerate(FsError::NameCollision(path.to_string())),
        None => {
            children.insert(parts.base.to_string(), Node::new_file(parts.base, content));
            Ok(())
        }
    }
}

fn copy(tree: &mut Tree, src: &str, dest: &str, mode: Mode) -> FsResult<()> {
    let Some(source) = tree.get(src) else {
        return mode.tolerate(FsError::NotFound(src.to_string()));
    };
    let mut duplicate = source.deep_copy();

    // An existing directory as destination receives the copy under the
    // source's own name.
    if tree.get(dest).is_some_and(Node::is_dir) {
        if path::is_root(src) {
            return mode.tolerate(FsError::RootImmutable);
        }
        let result = tree.insert(dest, duplicate, Resolve::MustExist);
        return mode.tolerate_collision(result);
    }

    let parts = PathParts::of(dest);
    duplicate.set_name(parts.base);
    let result = tree.insert(parts.parent, duplicate, mode.resolve());
    mode.tolerate_collision(result)
}

fn rename(tree: &mut Tree, src: &str, dest: &str, mode: Mode) -> FsResult<()> {
    if path::is_root(src) {
        return mode.tolerate(FsError::RootImmutable);
    }
    let Some(kind) = tree.get(src).map(Node::file_type) else {
        return mode.tolerate(FsError::NotFound(src.to_string()));
    };
    if dest != src && path::is_within(dest, src) {
        return mode.tolerate(FsError::Argument(format!(
            "cannot move {} into its own subtree {}",
            src, dest
        )));
    }

    let dest_parts = PathParts::of(dest);
    if dest_parts.is_root()
        || tree
            .dir_mut(dest_parts.parent, mode.resolve())?
            .contains_key(dest_parts.base)
    {
        return mode.tolerate(FsError::NameCollision(dest.to_string()));
    }

    // Detach then attach; nothing else observes the tree in between.
    let src_parts = PathParts::of(src);
    let mut node = tree.remove(src_parts.parent, src_parts.base, kind)?;
    node.set_name(dest_parts.base);
    tree.insert(dest_parts.parent, node, Resolve::MustExist)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op_mkdir(path: &str) -> Operation {
        Operation::CreateDirectory { path: path.into() }
    }

    #[test]
    fn params_round_trip_through_entry() {
        let op = Operation::Write {
            path: "/a".into(),
            content: "x, \"y\"".into(),
        };
        let entry = JournalEntry::new(3, op.kind(), op.params(), crate::types::Phase::Start);
        assert_eq!(Operation::from_entry(&entry).unwrap(), op);
    }

    #[test]
    fn missing_param_is_argument_error() {
        let entry = JournalEntry::new(3, OpKind::Cp, BTreeMap::new(), crate::types::Phase::Start);
        assert!(matches!(
            Operation::from_entry(&entry),
            Err(FsError::Argument(_))
        ));
    }

    #[test]
    fn replay_create_is_idempotent() {
        let mut tree = Tree::new();
        op_mkdir("/a").apply(&mut tree, Mode::Foreground).unwrap();
        assert_eq!(
            op_mkdir("/a").apply(&mut tree, Mode::Foreground),
            Err(FsError::NameCollision("/a".into()))
        );
        assert_eq!(op_mkdir("/a").apply(&mut tree, Mode::Replay), Ok(()));
    }

    #[test]
    fn replay_creates_missing_parents_foreground_does_not() {
        let mut tree = Tree::new();
        let touch = Operation::CreateFile {
            path: "/x/y/z.txt".into(),
        };
        assert!(matches!(
            touch.apply(&mut tree, Mode::Foreground),
            Err(FsError::NotFound(_))
        ));
        assert!(tree.root().is_empty_dir());

        touch.apply(&mut tree, Mode::Replay).unwrap();
        assert!(tree.get("/x/y/z.txt").unwrap().is_file());
    }

    #[test]
    fn write_onto_directory_collides() {
        let mut tree = Tree::new();
        op_mkdir("/d").apply(&mut tree, Mode::Foreground).unwrap();
        let write = Operation::Write {
            path: "/d".into(),
            content: "v".into(),
        };
        assert_eq!(
            write.apply(&mut tree, Mode::Foreground),
            Err(FsError::NameCollision("/d".into()))
        );
        assert!(tree.get("/d").unwrap().is_dir());
    }

    #[test]
    fn rename_into_own_subtree_is_rejected() {
        let mut tree = Tree::new();
        op_mkdir("/a").apply(&mut tree, Mode::Foreground).unwrap();
        op_mkdir("/a/b").apply(&mut tree, Mode::Foreground).unwrap();
        let mv = Operation::Rename {
            src: "/a".into(),
            dest: "/a/b/c".into(),
        };
        assert!(matches!(
            mv.apply(&mut tree, Mode::Foreground),
            Err(FsError::Argument(_))
        ));
        assert!(tree.get("/a/b").is_some());
    }

    #[test]
    fn rename_onto_itself_collides() {
        let mut tree = Tree::new();
        op_mkdir("/a").apply(&mut tree, Mode::Foreground).unwrap();
        let mv = Operation::Rename {
            src: "/a".into(),
            dest: "/a".into(),
        };
        assert_eq!(
            mv.apply(&mut tree, Mode::Foreground),
            Err(FsError::NameCollision("/a".into()))
        );
    }

    #[test]
    fn rename_keeps_subtree() {
        let mut tree = Tree::new();
        op_mkdir("/a").apply(&mut tree, Mode::Foreground).unwrap();
        op_mkdir("/b").apply(&mut tree, Mode::Foreground).unwrap();
        Operation::Write {
            path: "/a/f".into(),
            content: "data".into(),
        }
        .apply(&mut tree, Mode::Foreground)
        .unwrap();

        Operation::Rename {
            src: "/a".into(),
            dest: "/b/moved".into(),
        }
        .apply(&mut tree, Mode::Foreground)
        .unwrap();

        assert!(tree.get("/a").is_none());
        assert_eq!(tree.get("/b/moved").unwrap().name(), "moved");
        assert_eq!(tree.get("/b/moved/f").unwrap().content(), Some("data"));
    }

    #[test]
    fn copy_root_into_directory_is_rejected() {
        let mut tree = Tree::new();
        op_mkdir("/a").apply(&mut tree, Mode::Foreground).unwrap();
        let cp = Operation::Copy {
            src: "/".into(),
            dest: "/a".into(),
        };
        assert_eq!(
            cp.apply(&mut tree, Mode::Foreground),
            Err(FsError::RootImmutable)
        );
    }

    #[test]
    fn replay_skips_missing_sources() {
        let mut tree = Tree::new();
        let cp = Operation::Copy {
            src: "/nope".into(),
            dest: "/x".into(),
        };
        assert_eq!(cp.apply(&mut tree, Mode::Replay), Ok(()));
        let rm = Operation::DeleteFile {
            path: "/nope".into(),
        };
        assert_eq!(rm.apply(&mut tree, Mode::Replay), Ok(()));
        assert!(tree.root().is_empty_dir());
    }

    #[test]
    fn replay_skips_unremovable_directories() {
        let mut tree = Tree::new();
        op_mkdir("/a").apply(&mut tree, Mode::Foreground).unwrap();
        op_mkdir("/a/b").apply(&mut tree, Mode::Foreground).unwrap();
        let before = tree.clone();

        for path in ["/a", "/", "/gone"] {
            let rmdir = Operation::RemoveDirectory { path: path.into() };
            assert_eq!(rmdir.apply(&mut tree, Mode::Replay), Ok(()));
        }
        assert!(tree.get("/a/b").unwrap().is_dir());
        assert_eq!(tree, before);

        let rmdir = Operation::RemoveDirectory { path: "/a".into() };
        assert_eq!(
            rmdir.apply(&mut tree, Mode::Foreground),
            Err(FsError::NotEmpty("/a".into()))
        );
    }

    #[test]
    fn replay_rename_creates_destination_parents() {
        let mut tree = Tree::new();
        op_mkdir("/a").apply(&mut tree, Mode::Foreground).unwrap();
        Operation::Write {
            path: "/a/f".into(),
            content: "data".into(),
        }
        .apply(&mut tree, Mode::Foreground)
        .unwrap();

        let mv = Operation::Rename {
            src: "/a".into(),
            dest: "/x/y/z".into(),
        };
        assert!(matches!(
            mv.apply(&mut tree, Mode::Foreground),
            Err(FsError::NotFound(_))
        ));
        assert!(tree.get("/a/f").is_some());

        mv.apply(&mut tree, Mode::Replay).unwrap();
        assert!(tree.get("/a").is_none());
        assert!(tree.get("/x/y").unwrap().is_dir());
        assert_eq!(tree.get("/x/y/z").unwrap().name(), "z");
        assert_eq!(tree.get("/x/y/z/f").unwrap().content(), Some("data"));

        let after = tree.clone();
        assert_eq!(mv.apply(&mut tree, Mode::Replay), Ok(()));
        assert_eq!(tree, after);
    }

    #[test]
    fn replay_rename_onto_taken_name_is_skipped() {
        let mut tree = Tree::new();
        op_mkdir("/a").apply(&mut tree, Mode::Foreground).unwrap();
        op_mkdir("/b").apply(&mut tree, Mode::Foreground).unwrap();
        let before = tree.clone();

        let mv = Operation::Rename {
            src: "/a".into(),
            dest: "/b".into(),
        };
        assert_eq!(
            mv.apply(&mut tree, Mode::Foreground),
            Err(FsError::NameCollision("/b".into()))
        );
        assert_eq!(mv.apply(&mut tree, Mode::Replay), Ok(()));
        assert_eq!(tree, before);
    }
}
