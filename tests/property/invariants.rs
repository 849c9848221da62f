//! Property-based tests for bookkeeping, ordering, and persistence invariants

use foldertree::store::MemorySnapshotStore;
use foldertree::tree::{FileSystem, NodeId, SortMode};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Folder(usize, String),
    Leaf(usize, String),
    Move(usize, usize),
    Rename(usize, String),
    Remove(usize),
    Merge(usize, usize),
}

fn name_strategy() -> impl Strategy<Value = String> {
    // A tiny alphabet keeps collisions frequent.
    prop_oneof!["[a-c]{1,2}", "[a-c] \\([1-3]\\)", "[A-C]"]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<usize>(), name_strategy()).prop_map(|(p, n)| Op::Folder(p, n)),
        3 => (any::<usize>(), name_strategy()).prop_map(|(p, n)| Op::Leaf(p, n)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Move(a, b)),
        1 => (any::<usize>(), name_strategy()).prop_map(|(a, n)| Op::Rename(a, n)),
        1 => any::<usize>().prop_map(Op::Remove),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Merge(a, b)),
    ]
}

fn all_nodes(fs: &FileSystem<u32>) -> Vec<NodeId> {
    let mut nodes = vec![NodeId::ROOT];
    nodes.extend(
        fs.descendants(NodeId::ROOT, SortMode::Lexicographical)
            .unwrap()
            .map(|(id, _)| id),
    );
    nodes
}

fn folders(fs: &FileSystem<u32>) -> Vec<NodeId> {
    all_nodes(fs)
        .into_iter()
        .filter(|id| fs.node(*id).unwrap().is_folder())
        .collect()
}

/// Apply operations, ignoring rejected ones; leaf payloads are unique
fn build(ops: &[Op]) -> FileSystem<u32> {
    let mut fs = FileSystem::new();
    let mut payload = 0u32;
    for op in ops {
        let nodes = all_nodes(&fs);
        let dirs = folders(&fs);
        let pick = |i: usize| nodes[i % nodes.len()];
        let pick_dir = |i: usize| dirs[i % dirs.len()];
        let _ = match op {
            Op::Folder(p, name) => fs.create_folder(pick_dir(*p), name).map(|_| ()),
            Op::Leaf(p, name) => {
                payload += 1;
                fs.create_duplicate_leaf(pick_dir(*p), name, payload)
                    .map(|_| ())
            }
            Op::Move(a, b) => fs.move_to(pick(*a), pick_dir(*b)).map(|_| ()),
            Op::Rename(a, name) => fs.rename_with_duplicates(pick(*a), name).map(|_| ()),
            Op::Remove(a) => fs.remove(pick(*a)).map(|_| ()),
            Op::Merge(a, b) => fs.merge(pick_dir(*a), pick_dir(*b)).map(|_| ()),
        };
    }
    fs
}

fn entries(fs: &FileSystem<u32>) -> Vec<(String, Option<u32>)> {
    fs.descendants(NodeId::ROOT, SortMode::Lexicographical)
        .unwrap()
        .map(|(id, node)| (fs.full_path(id).unwrap(), node.value().copied()))
        .collect()
}

proptest! {
    #[test]
    fn counters_match_traversal(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let fs = build(&ops);
        for folder in folders(&fs) {
            let descendants: Vec<_> = fs
                .descendants(folder, SortMode::FoldersFirst)
                .unwrap()
                .collect();
            let leaves = descendants.iter().filter(|(_, node)| node.is_leaf()).count();
            let counts = fs.folder(folder).unwrap();
            prop_assert_eq!(counts.total_descendants(), descendants.len());
            prop_assert_eq!(counts.total_leaves(), leaves);
        }
        prop_assert_eq!(fs.len(), fs.total_descendants() + 1);
    }

    #[test]
    fn depth_and_index_are_consistent(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let fs = build(&ops);
        for (id, node) in fs.descendants(NodeId::ROOT, SortMode::Lexicographical).unwrap() {
            let parent_id = node.parent().unwrap();
            let parent = fs.node(parent_id).unwrap();
            prop_assert_eq!(node.depth(), parent.depth() + 1);
            let siblings = fs.folder(parent_id).unwrap().children();
            prop_assert_eq!(siblings[node.index_in_parent()], id);
        }
    }

    #[test]
    fn inverse_modes_reverse_forward_modes(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let fs = build(&ops);
        let pairs = [
            (SortMode::FoldersFirst, SortMode::InverseFoldersFirst),
            (SortMode::FoldersLast, SortMode::InverseFoldersLast),
            (SortMode::Lexicographical, SortMode::InverseLexicographical),
        ];
        for folder in folders(&fs) {
            for (forward, inverse) in pairs {
                let mut expected: Vec<NodeId> =
                    fs.children(folder, forward).unwrap().map(|(id, _)| id).collect();
                expected.reverse();
                let actual: Vec<NodeId> =
                    fs.children(folder, inverse).unwrap().map(|(id, _)| id).collect();
                prop_assert_eq!(actual, expected);
            }
        }
    }

    #[test]
    fn save_then_load_round_trips(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let original = build(&ops);
        let store = MemorySnapshotStore::new();
        original
            .save(&store, |value: &u32, _| (value.to_string(), true), true)
            .unwrap();

        let objects: Vec<u32> = entries(&original)
            .into_iter()
            .filter_map(|(_, value)| value)
            .collect();
        let mut loaded = FileSystem::new();
        let changed = loaded
            .load(&store, objects, |value: &u32| value.to_string(), |value: &u32| value.to_string())
            .unwrap();

        prop_assert!(!changed);
        prop_assert_eq!(entries(&loaded), entries(&original));
    }
}

/// Loading twice from the same store gives the same tree
#[test]
fn test_load_idempotence_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec(op_strategy(), 0..40),
            |ops| {
                let original = build(&ops);
                let store = MemorySnapshotStore::new();
                original
                    .save(&store, |value: &u32, _| (value.to_string(), true), true)
                    .unwrap();
                let objects: Vec<u32> = entries(&original)
                    .into_iter()
                    .filter_map(|(_, value)| value)
                    .collect();

                let mut fs = FileSystem::new();
                fs.load(&store, objects.clone(), |v: &u32| v.to_string(), |v: &u32| v.to_string())
                    .unwrap();
                let first = entries(&fs);
                fs.load(&store, objects, |v: &u32| v.to_string(), |v: &u32| v.to_string())
                    .unwrap();
                assert_eq!(entries(&fs), first);

                Ok(())
            },
        )
        .unwrap();
}
