//! Integration tests for saving and loading snapshots on disk

use foldertree::store::{FileSnapshotStore, Snapshot};
use foldertree::tree::{FileSystem, NodeId, NodeKind, SortMode};
use std::fs;
use tempfile::TempDir;

fn identity(value: &String) -> String {
    value.clone()
}

fn keep_all(value: &String, _path: &str) -> (String, bool) {
    (value.clone(), true)
}

/// Every node as (full path, payload), in pre-order
fn entries(fs: &FileSystem<String>) -> Vec<(String, Option<String>)> {
    fs.descendants(NodeId::ROOT, SortMode::Lexicographical)
        .unwrap()
        .map(|(id, node)| (fs.full_path(id).unwrap(), node.value().cloned()))
        .collect()
}

fn leaf_values(fs: &FileSystem<String>) -> Vec<String> {
    fs.descendants(NodeId::ROOT, SortMode::Lexicographical)
        .unwrap()
        .filter_map(|(_, node)| node.value().cloned())
        .collect()
}

fn sample_tree() -> FileSystem<String> {
    let mut fs = FileSystem::new();
    let (_, strategy) = fs.create_all_folders("games/strategy").unwrap();
    let (_, puzzle) = fs.create_all_folders("games/puzzle").unwrap();
    fs.create_all_folders("archive/2019").unwrap();
    fs.create_leaf(strategy, "Chess", "chess".to_string()).unwrap();
    fs.create_leaf(strategy, "Go", "go".to_string()).unwrap();
    fs.create_leaf(puzzle, "Sudoku", "sudoku".to_string()).unwrap();
    fs.create_leaf(NodeId::ROOT, "Readme", "readme".to_string()).unwrap();
    fs
}

/// Saving then loading reproduces the same tree and reports no change
#[test]
fn test_round_trip_reproduces_tree() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");

    let original = sample_tree();
    original.save_to_file(&path, keep_all, true).unwrap();

    let mut loaded = FileSystem::new();
    let changed = loaded
        .load_from_file(&path, leaf_values(&original), identity, identity)
        .unwrap();

    assert!(!changed);
    assert_eq!(entries(&loaded), entries(&original));
    assert_eq!(loaded.total_descendants(), original.total_descendants());
    assert_eq!(loaded.total_leaves(), original.total_leaves());
}

/// The written document lists leaves in lexicographic traversal order
#[test]
fn test_saved_document_shape() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    sample_tree().save_to_file(&path, keep_all, true).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let document: serde_json::Value = serde_json::from_str(&text).unwrap();
    let keys: Vec<&String> = document["Data"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["readme", "sudoku", "chess", "go"]);
    assert_eq!(document["Data"]["go"], "games/strategy/Go");
    assert_eq!(document["EmptyFolders"], serde_json::json!(["archive/2019"]));

    // Indented output
    assert!(text.contains("\n  \"Data\""));
}

/// Without empty folders requested, the field is absent and empty folders are lost
#[test]
fn test_round_trip_without_empty_folders() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    let original = sample_tree();
    original.save_to_file(&path, keep_all, false).unwrap();

    let snapshot = Snapshot::read(&FileSnapshotStore::new(&path))
        .unwrap()
        .unwrap();
    assert!(snapshot.empty_folders.is_none());

    let mut loaded = FileSystem::new();
    loaded
        .load_from_file(&path, leaf_values(&original), identity, identity)
        .unwrap();
    assert!(loaded.find("archive").is_none());
    assert!(loaded.find("games/strategy/Chess").is_some());
}

/// Loading the same document twice yields the same tree
#[test]
fn test_load_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    sample_tree().save_to_file(&path, keep_all, true).unwrap();
    let objects = leaf_values(&sample_tree());

    let mut fs = FileSystem::new();
    fs.load_from_file(&path, objects.clone(), identity, identity)
        .unwrap();
    let first = entries(&fs);
    fs.load_from_file(&path, objects, identity, identity).unwrap();

    assert_eq!(entries(&fs), first);
    assert_eq!(fs.next_identifier() as usize, fs.total_descendants() + 1);
}

/// A missing file is a first run: nothing loaded, nothing changed
#[test]
fn test_missing_file_loads_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut fs = sample_tree();
    let changed = fs
        .load_from_file(
            temp_dir.path().join("absent.json"),
            vec!["x".to_string()],
            identity,
            identity,
        )
        .unwrap();
    assert!(!changed);
    assert_eq!(fs.total_descendants(), 0);
}

/// A corrupt file resets to empty and asks for a re-save
#[test]
fn test_corrupt_file_resets_tree() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    fs::write(&path, "{\"Data\": {\"a\": ").unwrap();

    let mut tree = sample_tree();
    let changed = tree
        .load_from_file(&path, vec!["a".to_string()], identity, identity)
        .unwrap();
    assert!(changed);
    assert_eq!(tree.total_descendants(), 0);
}

/// Bytes that are not UTF-8 count as a corrupt document, not a read failure
#[test]
fn test_invalid_utf8_file_resets_tree() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    fs::write(&path, [0xff, 0xfe, b'{', 0x80]).unwrap();

    let mut tree = sample_tree();
    let changed = tree
        .load_from_file(&path, vec!["a".to_string()], identity, identity)
        .unwrap();
    assert!(changed);
    assert_eq!(tree.total_descendants(), 0);
}

/// A saved leaf blocking a folder chain skips the object that needs the folder
#[test]
fn test_leaf_blocking_folder_skips_object() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    fs::write(&path, r#"{ "Data": { "a": "X", "b": "X/inner" } }"#).unwrap();

    let mut tree = FileSystem::new();
    let changed = tree
        .load_from_file(
            &path,
            vec!["a".to_string(), "b".to_string()],
            identity,
            identity,
        )
        .unwrap();

    assert!(changed);
    let leaf = tree.find("X").unwrap();
    assert_eq!(tree.value(leaf), Some(&"a".to_string()));
    assert!(tree.find("X/inner").is_none());
    assert_eq!(tree.total_leaves(), 1);
}

/// Two objects with one saved entry: the second is skipped and flagged
#[test]
fn test_repeated_identifier_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    fs::write(&path, r#"{ "Data": { "a": "f/A" } }"#).unwrap();

    let mut tree = FileSystem::new();
    let changed = tree
        .load_from_file(
            &path,
            vec!["a".to_string(), "a".to_string()],
            identity,
            identity,
        )
        .unwrap();

    assert!(changed);
    assert_eq!(tree.total_leaves(), 1);
    assert!(tree.find("f/A").is_some());
    assert!(tree.find("a").is_none());

    tree.save_to_file(&path, keep_all, true).unwrap();
    let saved = Snapshot::read(&FileSnapshotStore::new(&path))
        .unwrap()
        .unwrap();
    assert_eq!(saved.data, vec![("a".to_string(), "f/A".to_string())]);
}

/// A leaf and a folder wanting the same name are separated by suffixing
#[test]
fn test_leaf_folder_collision_is_renamed() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    fs::write(&path, r#"{ "Data": { "a": "X", "b": "X/inner" } }"#).unwrap();

    let mut tree = FileSystem::new();
    let changed = tree
        .load_from_file(
            &path,
            vec!["b".to_string(), "a".to_string()],
            identity,
            identity,
        )
        .unwrap();

    assert!(changed);
    let folder = tree.find("X").unwrap();
    assert!(tree.node(folder).unwrap().is_folder());
    assert!(tree.find("X/inner").is_some());
    let renamed = tree.find("X (2)").unwrap();
    assert_eq!(tree.value(renamed), Some(&"a".to_string()));
}

/// Objects missing from the snapshot land at the root under their display name
#[test]
fn test_new_objects_go_to_root() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    fs::write(&path, r#"{ "Data": { "1": "docs/One" }, "EmptyFolders": [] }"#).unwrap();

    let mut tree = FileSystem::new();
    let changed = tree
        .load_from_file(
            &path,
            vec!["1".to_string(), "2".to_string()],
            identity,
            |value: &String| format!("Item {}", value),
        )
        .unwrap();

    assert!(!changed);
    assert!(tree.find("docs/One").is_some());
    let added = tree.find("Item 2").unwrap();
    assert!(matches!(tree.node(added).unwrap().kind(), NodeKind::Leaf(_)));
    assert_eq!(tree.node(added).unwrap().depth(), 0);
}

/// Saving replaces whatever was on disk before
#[test]
fn test_save_truncates_previous_contents() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tree.json");
    sample_tree().save_to_file(&path, keep_all, true).unwrap();

    let empty: FileSystem<String> = FileSystem::new();
    empty.save_to_file(&path, keep_all, true).unwrap();

    let snapshot = Snapshot::parse(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(snapshot.data.is_empty());
    assert_eq!(snapshot.empty_folders, Some(Vec::new()));
}
