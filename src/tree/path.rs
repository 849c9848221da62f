//! Name normalization and path splitting utilities

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Separator between segments of a full path
pub const SEPARATOR: char = '/';

/// Replacement for separators found inside a single name
const SEPARATOR_REPLACEMENT: char = '\\';

fn duplicate_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| Regex::new(r"^(?P<stem>.*)\((?P<count>\d+)\)$").expect("valid regex"))
}

/// Normalize a display name so it can be stored as a single path segment
///
/// This function:
/// 1. Normalizes Unicode to NFC
/// 2. Drops control characters
/// 3. Replaces the path separator with a backslash
/// 4. Trims surrounding whitespace
pub fn fix_name(name: &str) -> String {
    let normalized: String = name
        .nfc()
        .filter(|c| !c.is_control())
        .map(|c| if c == SEPARATOR { SEPARATOR_REPLACEMENT } else { c })
        .collect();
    normalized.trim().to_string()
}

/// Produce the next candidate name after a collision
///
/// `"Item"` becomes `"Item (2)"`, `"Item (2)"` becomes `"Item (3)"`.
pub fn fix_duplicate_name(name: &str) -> String {
    if let Some(caps) = duplicate_suffix().captures(name) {
        if let Ok(count) = caps["count"].parse::<u64>() {
            if let Some(next) = count.checked_add(1) {
                return format!("{}({})", &caps["stem"], next);
            }
        }
    }
    format!("{} (2)", name)
}

/// Split a full path into its directory segments and final name
///
/// Empty segments are skipped and every segment goes through [`fix_name`].
/// Returns `None` when the path has no non-empty segment.
pub fn split_path(path: &str) -> Option<(Vec<String>, String)> {
    let mut segments: Vec<String> = path
        .split(SEPARATOR)
        .map(fix_name)
        .filter(|segment| !segment.is_empty())
        .collect();
    let name = segments.pop()?;
    Some((segments, name))
}

/// Split a folder path into normalized segments
pub fn folder_segments(path: &str) -> Vec<String> {
    path.split(SEPARATOR)
        .map(fix_name)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Join segments with the path separator
pub fn join_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = String::new();
    for segment in segments {
        if !result.is_empty() {
            result.push(SEPARATOR);
        }
        result.push_str(segment.as_ref());
    }
    result
}
