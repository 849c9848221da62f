//! CLI presentation: text and json formatters for tree views.

use crate::config::FolderTreeConfig;
use crate::error::ApiError;
use crate::tree::{FileSystem, NodeId, NodeKind, SortMode};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// Render the hierarchy as an indented outline.
///
/// Folders end with `/`; leaves show their payload in brackets.
pub fn format_tree<T: Display>(
    fs: &FileSystem<T>,
    mode: SortMode,
    title: &str,
    color: bool,
) -> Result<String, ApiError> {
    let mut out = String::new();
    if color {
        out.push_str(&format!("{}\n", title.bold().underline()));
    } else {
        out.push_str(&format!("{}\n", title));
    }

    for (_, node) in fs.descendants(NodeId::ROOT, mode)? {
        let indent = "  ".repeat(usize::try_from(node.depth()).unwrap_or(0) + 1);
        let line = match node.kind() {
            NodeKind::Folder(_) if color => format!("{}/", node.name().blue().bold()),
            NodeKind::Folder(_) => format!("{}/", node.name()),
            NodeKind::Leaf(leaf) if color => {
                format!("{} {}", node.name(), format!("[{}]", leaf.value()).dimmed())
            }
            NodeKind::Leaf(leaf) => format!("{} [{}]", node.name(), leaf.value()),
        };
        out.push_str(&indent);
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&format!(
        "\n{} folders, {} leaves",
        fs.total_descendants() - fs.total_leaves(),
        fs.total_leaves()
    ));
    Ok(out)
}

/// One row per leaf: payload, full path, depth
fn list_rows<T: Display>(fs: &FileSystem<T>) -> Result<Vec<(String, String, i32)>, ApiError> {
    let mut rows = Vec::new();
    for (id, node) in fs.descendants(NodeId::ROOT, SortMode::Lexicographical)? {
        if let NodeKind::Leaf(leaf) = node.kind() {
            rows.push((leaf.value().to_string(), fs.full_path(id)?, node.depth()));
        }
    }
    Ok(rows)
}

/// Leaf listing as a table
pub fn format_list_text<T: Display>(fs: &FileSystem<T>) -> Result<String, ApiError> {
    let rows = list_rows(fs)?;
    if rows.is_empty() {
        return Ok("No leaves.".to_string());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Identifier", "Path", "Depth"]);
    for (identifier, path, depth) in rows {
        table.add_row(vec![identifier, path, depth.to_string()]);
    }
    Ok(table.to_string())
}

/// Leaf listing as a JSON array
pub fn format_list_json<T: Display>(fs: &FileSystem<T>) -> Result<String, ApiError> {
    let rows: Vec<serde_json::Value> = list_rows(fs)?
        .into_iter()
        .map(|(identifier, path, depth)| {
            serde_json::json!({
                "identifier": identifier,
                "path": path,
                "depth": depth,
            })
        })
        .collect();
    serde_json::to_string_pretty(&rows)
        .map_err(|e| ApiError::Storage(crate::error::StorageError::Serialization(e)))
}

/// Effective configuration as TOML
pub fn format_config(config: &FolderTreeConfig) -> Result<String, ApiError> {
    config.to_toml()
}
