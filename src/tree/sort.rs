//! Traversal ordering policies

use crate::error::FsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordering applied when enumerating a folder's children
///
/// Sort modes are a read-time policy; storage order never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Folders (storage order) followed by leaves (storage order)
    #[default]
    FoldersFirst,
    /// Leaves followed by folders
    FoldersLast,
    /// Plain storage order, which is name-sorted
    Lexicographical,
    InverseFoldersFirst,
    InverseFoldersLast,
    InverseLexicographical,
}

impl SortMode {
    pub const ALL: [SortMode; 6] = [
        SortMode::FoldersFirst,
        SortMode::FoldersLast,
        SortMode::Lexicographical,
        SortMode::InverseFoldersFirst,
        SortMode::InverseFoldersLast,
        SortMode::InverseLexicographical,
    ];

    /// The mode enumerating the exact reverse sequence of this one
    pub fn inverse(self) -> SortMode {
        match self {
            SortMode::FoldersFirst => SortMode::InverseFoldersFirst,
            SortMode::FoldersLast => SortMode::InverseFoldersLast,
            SortMode::Lexicographical => SortMode::InverseLexicographical,
            SortMode::InverseFoldersFirst => SortMode::FoldersFirst,
            SortMode::InverseFoldersLast => SortMode::FoldersLast,
            SortMode::InverseLexicographical => SortMode::Lexicographical,
        }
    }

    pub fn is_inverse(self) -> bool {
        matches!(
            self,
            SortMode::InverseFoldersFirst
                | SortMode::InverseFoldersLast
                | SortMode::InverseLexicographical
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::FoldersFirst => "folders-first",
            SortMode::FoldersLast => "folders-last",
            SortMode::Lexicographical => "lexicographical",
            SortMode::InverseFoldersFirst => "inverse-folders-first",
            SortMode::InverseFoldersLast => "inverse-folders-last",
            SortMode::InverseLexicographical => "inverse-lexicographical",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "foldersfirst" => Ok(SortMode::FoldersFirst),
            "folderslast" => Ok(SortMode::FoldersLast),
            "lexicographical" => Ok(SortMode::Lexicographical),
            "inversefoldersfirst" => Ok(SortMode::InverseFoldersFirst),
            "inversefolderslast" => Ok(SortMode::InverseFoldersLast),
            "inverselexicographical" => Ok(SortMode::InverseLexicographical),
            _ => Err(FsError::InvalidConfiguration(format!(
                "unknown sort mode '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<u8> for SortMode {
    type Error = FsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SortMode::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| FsError::InvalidConfiguration(format!("unknown sort mode {}", value)))
    }
}
