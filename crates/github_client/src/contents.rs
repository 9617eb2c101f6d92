//! Repository contents domain types.
//!
//! This module contains the wire types returned by the GitHub Contents API
//! when listing a directory.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "contents_tests.rs"]
mod tests;

/// A single entry in a GitHub repository directory listing.
///
/// Returned by `GET /repos/{owner}/{repo}/contents/{path}` when `path` names
/// a directory. Only the fields the tree needs are kept.
///
/// # Examples
///
/// ```rust
/// use github_client::{ContentEntry, EntryType};
///
/// let entry = ContentEntry {
///     name: "src".to_string(),
///     path: "crates/core/src".to_string(),
///     entry_type: EntryType::Dir,
///     sha: "abc123".to_string(),
///     size: 0,
/// };
///
/// assert!(entry.is_directory());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Entry name, the last path segment
    pub name: String,

    /// Full path within the repository
    pub path: String,

    /// Entry type as reported by GitHub
    #[serde(rename = "type")]
    pub entry_type: EntryType,

    /// Git blob or tree SHA; changes whenever the content changes
    #[serde(default)]
    pub sha: String,

    /// Size in bytes (0 for directories)
    #[serde(default)]
    pub size: u64,
}

impl ContentEntry {
    /// Returns `true` if the entry can contain other entries.
    ///
    /// Symlinks and submodules are presented as files, the way the GitHub
    /// web UI lists them.
    pub fn is_directory(&self) -> bool {
        matches!(self.entry_type, EntryType::Dir)
    }
}

/// Type of entry in a repository directory.
///
/// Maps to the `type` field in the Contents API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Regular file
    File,

    /// Directory
    Dir,

    /// Symbolic link
    Symlink,

    /// Git submodule reference
    Submodule,
}

/// Base64 encoded file payload as returned by the license and single-file
/// contents endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EncodedContent {
    pub content: String,

    #[serde(default)]
    pub encoding: Option<String>,
}
