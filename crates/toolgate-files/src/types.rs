//! Result types of the filesystem provider.
//!
//! All types serialize with camelCase field names and every operation result
//! carries a human-readable `message`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::time::SystemTime;

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    /// File or directory name
    pub name: String,
    /// Path relative to the project root
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified_at: Option<DateTime<Utc>>,
    /// Entry kind
    pub kind: EntryKind,
}

/// How a search hit matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// The file name contains the query
    Filename,
    /// The file content contains the query
    Content,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    /// File name
    pub name: String,
    /// Path relative to the project root
    pub path: String,
    /// Filename or content match
    pub match_kind: MatchKind,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified_at: Option<DateTime<Utc>>,
}

/// A node of an exported directory tree.
///
/// Files carry `size`; directories carry `children` (possibly empty when the
/// depth limit cut them off).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Entry name (`.` for the project root)
    pub name: String,
    /// Entry kind
    pub kind: EntryKind,
    /// Path relative to the project root
    pub path: String,
    /// Size in bytes, files only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Children, directories only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// Returns the deepest nesting level below this node.
    ///
    /// A node without children has depth 0; its children are at depth 1 of
    /// this count, which corresponds to depth 0 of the structure export.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .flatten()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Returns the total number of nodes below this one.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .flatten()
            .map(|child| child.descendant_count() + 1)
            .sum()
    }

    /// Finds a descendant by root-relative path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Self> {
        if self.path == path {
            return Some(self);
        }
        self.children
            .iter()
            .flatten()
            .find_map(|child| child.find(path))
    }
}

/// Result of `read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    /// Human-readable summary
    pub message: String,
    /// File content
    pub content: String,
    /// Path relative to the project root
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified_at: Option<DateTime<Utc>>,
}

/// Result of `write`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    /// Human-readable summary
    pub message: String,
    /// Path relative to the project root
    pub path: String,
    /// Size in bytes after the write
    pub size: u64,
    /// Modification time after the write
    pub modified_at: Option<DateTime<Utc>>,
}

/// Result of `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    /// Human-readable summary
    pub message: String,
    /// Listed directory, relative to the project root
    pub path: String,
    /// Child directories, sorted by name
    pub directories: Vec<DirectoryEntry>,
    /// Child files, sorted by name
    pub files: Vec<DirectoryEntry>,
    /// `directories.len() + files.len()`
    pub total_items: usize,
}

/// Result of operations that only confirm a path (`mkdir`, `delete`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    /// Human-readable summary
    pub message: String,
    /// Affected path, relative to the project root
    pub path: String,
}

/// Result of `stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct StatResult {
    /// Human-readable summary
    pub message: String,
    /// Path relative to the project root
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Creation time, where the platform records it
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time
    pub modified_at: Option<DateTime<Utc>>,
    /// Last access time
    pub accessed_at: Option<DateTime<Utc>>,
    /// Regular file flag
    pub is_file: bool,
    /// Directory flag
    pub is_directory: bool,
    /// Octal mode bits on Unix (`"644"`), `readonly`/`readwrite` elsewhere
    pub permissions: String,
}

/// Result of `search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Human-readable summary
    pub message: String,
    /// The query as received
    pub query: String,
    /// First matches, capped at the search result limit
    pub results: Vec<SearchMatch>,
    /// True number of matches in the subtree
    pub total_found: usize,
}

/// Result of `structure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureResult {
    /// Human-readable summary
    pub message: String,
    /// Depth limit that was applied
    pub max_depth: usize,
    /// Exported tree
    pub structure: TreeNode,
}

/// Converts a filesystem timestamp, if the platform provides one.
pub(crate) fn timestamp(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

/// Formats permission bits for `stat`.
#[cfg(unix)]
pub(crate) fn permissions(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:o}", metadata.permissions().mode() & 0o777)
}

/// Formats permission bits for `stat`.
#[cfg(not(unix))]
pub(crate) fn permissions(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() {
        "readonly".to_string()
    } else {
        "readwrite".to_string()
    }
}
