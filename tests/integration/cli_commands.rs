//! Integration tests for CLI commands against snapshot files

use foldertree::cli::{Commands, RunContext};
use foldertree::config::FolderTreeConfig;
use foldertree::error::ApiError;
use foldertree::store::Snapshot;
use std::fs;
use tempfile::TempDir;

fn context(temp_dir: &TempDir) -> RunContext {
    RunContext::with_config(
        temp_dir.path().to_path_buf(),
        FolderTreeConfig::default(),
        None,
    )
    .unwrap()
}

fn snapshot(temp_dir: &TempDir) -> Snapshot {
    let text = fs::read_to_string(temp_dir.path().join("foldertree.json")).unwrap();
    Snapshot::parse(&text).unwrap()
}

#[test]
fn test_edit_session() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("foldertree.json"),
        r#"{ "Data": { "101": "inbox/Report", "102": "inbox/Photo" }, "EmptyFolders": [] }"#,
    )
    .unwrap();
    let ctx = context(&temp_dir);

    ctx.execute(&Commands::Mkdir {
        path: "work/2024".to_string(),
    })
    .unwrap();
    ctx.execute(&Commands::Mv {
        from: "inbox/Report".to_string(),
        to: "work/2024".to_string(),
    })
    .unwrap();
    ctx.execute(&Commands::Mv {
        from: "inbox/Photo".to_string(),
        to: "Photo of the day".to_string(),
    })
    .unwrap();

    let saved = snapshot(&temp_dir);
    assert_eq!(
        saved.data,
        vec![
            ("102".to_string(), "Photo of the day".to_string()),
            ("101".to_string(), "work/2024/Report".to_string()),
        ]
    );
    assert_eq!(saved.empty_folders, Some(vec!["inbox".to_string()]));

    ctx.execute(&Commands::Rm {
        path: "inbox".to_string(),
    })
    .unwrap();
    assert_eq!(snapshot(&temp_dir).empty_folders, Some(Vec::new()));
}

#[test]
fn test_tree_and_list_output() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("foldertree.json"),
        r#"{ "Data": { "1": "b/Leaf", "2": "Top" }, "EmptyFolders": ["a"] }"#,
    )
    .unwrap();
    let ctx = context(&temp_dir);

    let tree = ctx
        .execute(&Commands::Tree {
            sort: Some("folders-last".to_string()),
        })
        .unwrap();
    let lines: Vec<&str> = tree.lines().skip(1).take(4).collect();
    assert_eq!(lines, ["  Top [2]", "  a/", "  b/", "    Leaf [1]"]);

    let list = ctx
        .execute(&Commands::List {
            format: "json".to_string(),
        })
        .unwrap();
    let rows: serde_json::Value = serde_json::from_str(&list).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[0]["identifier"], "2");
    assert_eq!(rows[1]["path"], "b/Leaf");
}

#[test]
fn test_rejected_edit_leaves_snapshot_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let original = r#"{ "Data": { "1": "a/One", "2": "b/One" } }"#;
    fs::write(temp_dir.path().join("foldertree.json"), original).unwrap();
    let ctx = context(&temp_dir);

    let err = ctx
        .execute(&Commands::Mv {
            from: "a/One".to_string(),
            to: "b".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Fs(_)));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("foldertree.json")).unwrap(),
        original
    );

    let err = ctx
        .execute(&Commands::Mv {
            from: "a".to_string(),
            to: "a/inside".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Fs(_)));
}

#[test]
fn test_list_rejects_unknown_format() {
    let temp_dir = TempDir::new().unwrap();
    let err = context(&temp_dir)
        .execute(&Commands::List {
            format: "yaml".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(_)));
}
