//! Sort orders for the selected file list

use crate::files::SelectedFile;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Four-state sort cycle used by the compress page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    SizeAsc,
    SizeDesc,
}

impl SortOrder {
    /// name-asc -> name-desc -> size-asc -> size-desc -> name-asc
    pub fn next(self) -> Self {
        match self {
            SortOrder::NameAsc => SortOrder::NameDesc,
            SortOrder::NameDesc => SortOrder::SizeAsc,
            SortOrder::SizeAsc => SortOrder::SizeDesc,
            SortOrder::SizeDesc => SortOrder::NameAsc,
        }
    }

    /// Stable in-place sort
    pub fn apply(self, files: &mut [SelectedFile]) {
        match self {
            SortOrder::NameAsc => files.sort_by(|a, b| compare_names(&a.name, &b.name)),
            SortOrder::NameDesc => files.sort_by(|a, b| compare_names(&b.name, &a.name)),
            SortOrder::SizeAsc => files.sort_by_key(|f| f.size),
            SortOrder::SizeDesc => files.sort_by(|a, b| b.size.cmp(&a.size)),
        }
    }

    /// Arrow shown on the sort button once this order is active
    pub fn glyph(self) -> &'static str {
        match self {
            SortOrder::NameAsc => "↑",
            SortOrder::NameDesc | SortOrder::SizeDesc => "↓",
            SortOrder::SizeAsc => "↕",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SortOrder::NameAsc => "Sort by name (A-Z)",
            SortOrder::NameDesc => "Sort by name (Z-A)",
            SortOrder::SizeAsc => "Sort by size (smallest first)",
            SortOrder::SizeDesc => "Sort by size (largest first)",
        }
    }

    /// e.g. "Files sorted by size (descending)"
    pub fn notice_text(self) -> String {
        let label = match self {
            SortOrder::NameAsc => "name",
            SortOrder::NameDesc => "name (descending)",
            SortOrder::SizeAsc => "size",
            SortOrder::SizeDesc => "size (descending)",
        };
        format!("Files sorted by {}", label)
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name-asc" | "name" => Ok(SortOrder::NameAsc),
            "name-desc" => Ok(SortOrder::NameDesc),
            "size-asc" | "size" => Ok(SortOrder::SizeAsc),
            "size-desc" => Ok(SortOrder::SizeDesc),
            other => Err(format!(
                "Invalid sort order: {} (expected name-asc, name-desc, size-asc or size-desc)",
                other
            )),
        }
    }
}

/// Sort choices on the merge page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeSort {
    Asc,
    Desc,
    /// Insertion order
    Original,
}

impl std::str::FromStr for MergeSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(MergeSort::Asc),
            "desc" => Ok(MergeSort::Desc),
            "original" => Ok(MergeSort::Original),
            other => Err(format!("Invalid sort order: {}", other)),
        }
    }
}

/// Case-insensitive first, then exact, so "a.pdf" and "A.pdf" order deterministically
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
