//! Tests for the in-memory tree.

use super::*;
use crate::error::FsError;
use crate::types::FileType;

fn sample_tree() -> Tree {
    let mut tree = Tree::new();
    tree.insert("/", Node::new_dir("docs"), Resolve::MustExist)
        .unwrap();
    tree.insert("/docs", Node::new_file("a.txt", "hello"), Resolve::MustExist)
        .unwrap();
    tree
}

#[test]
fn test_new_tree_has_root() {
    let tree = Tree::new();
    assert!(tree.is_well_formed());
    assert!(tree.root().is_empty_dir());
    assert_eq!(tree.get("/").map(Node::name), Some("/"));
}

#[test]
fn test_insert_and_get() {
    let tree = sample_tree();
    let file = tree.get("/docs/a.txt").unwrap();
    assert!(file.is_file());
    assert_eq!(file.content(), Some("hello"));
    assert_eq!(file.size(), 5);
    assert!(tree.get("/docs/missing").is_none());
    assert!(tree.get("/docs/a.txt/deeper").is_none());
}

#[test]
fn test_names_unique_across_kinds() {
    let mut tree = sample_tree();
    let result = tree.insert("/", Node::new_file("docs", ""), Resolve::MustExist);
    assert_eq!(result, Err(FsError::NameCollision("/docs".into())));

    let result = tree.insert("/docs", Node::new_dir("a.txt"), Resolve::MustExist);
    assert_eq!(result, Err(FsError::NameCollision("/docs/a.txt".into())));
}

#[test]
fn test_must_exist_walk_fails_on_missing_segment() {
    let mut tree = Tree::new();
    let result = tree.insert("/a/b", Node::new_dir("c"), Resolve::MustExist);
    assert_eq!(result, Err(FsError::NotFound("/a/b".into())));
    assert!(tree.root().is_empty_dir());
}

#[test]
fn test_create_missing_walk_builds_intermediates() {
    let mut tree = Tree::new();
    tree.insert("/a/b", Node::new_dir("c"), Resolve::CreateMissing)
        .unwrap();
    assert!(tree.get("/a").unwrap().is_dir());
    assert!(tree.get("/a/b").unwrap().is_dir());
    assert!(tree.get("/a/b/c").unwrap().is_dir());
}

#[test]
fn test_create_missing_never_shadows_a_file() {
    let mut tree = sample_tree();
    let result = tree.insert("/docs/a.txt/sub", Node::new_dir("x"), Resolve::CreateMissing);
    assert!(matches!(result, Err(FsError::NotFound(_))));
    assert!(tree.get("/docs/a.txt").unwrap().is_file());
}

#[test]
fn test_lookup_respects_kind() {
    let tree = sample_tree();
    assert!(tree.lookup("/docs", "a.txt", FileType::File).is_some());
    assert!(tree.lookup("/docs", "a.txt", FileType::Dir).is_none());
    assert!(tree.lookup("/", "docs", FileType::Dir).is_some());
    assert!(tree.lookup("/nope", "docs", FileType::Dir).is_none());
}

#[test]
fn test_remove_requires_matching_kind() {
    let mut tree = sample_tree();
    let result = tree.remove("/docs", "a.txt", FileType::Dir);
    assert!(matches!(result, Err(FsError::NotFound(_))));

    let removed = tree.remove("/docs", "a.txt", FileType::File).unwrap();
    assert_eq!(removed.name(), "a.txt");
    assert!(tree.get("/docs").unwrap().is_empty_dir());
}

#[test]
fn test_list_directory() {
    let mut tree = sample_tree();
    tree.insert("/docs", Node::new_dir("sub"), Resolve::MustExist)
        .unwrap();

    let entries = tree.list("/docs").unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "a.txt");
    assert_eq!(entries[0].size, 5);
    assert!(entries[1].is_dir());

    assert!(matches!(tree.list("/docs/a.txt"), Err(FsError::NotFound(_))));
}

#[test]
fn test_deep_copy_is_independent() {
    let tree = sample_tree();
    let original = tree.get("/docs").unwrap();
    let mut copy = original.deep_copy();
    assert_eq!(&copy, original);

    if let Some(Node::File { content, .. }) = copy.children_mut().unwrap().get_mut("a.txt") {
        content.push_str(" world");
    }
    assert_ne!(&copy, original);
    assert_eq!(
        tree.get("/docs/a.txt").unwrap().content(),
        Some("hello")
    );
}

#[test]
fn test_equality_ignores_timestamps() {
    let a = Node::new_file("x", "1");
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = Node::new_file("x", "1");
    assert_ne!(a.created_at(), b.created_at());
    assert_eq!(a, b);
    assert_ne!(a, Node::new_dir("x"));
}
