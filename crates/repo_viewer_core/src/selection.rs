//! Paths marked for download, kept apart from expansion state.

use std::collections::BTreeSet;

use crate::directory_cache::DirectoryCache;

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;

/// The set of paths the user has marked for download.
///
/// Files and directories may both be selected; a selected directory stands
/// for everything below it. Iteration is in path order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    paths: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `path` if absent, removes it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.paths.remove(path) {
            false
        } else {
            self.paths.insert(path.to_string());
            true
        }
    }

    /// Marks `path` as included or not.
    pub fn set(&mut self, path: &str, included: bool) {
        if included {
            self.paths.insert(path.to_string());
        } else {
            self.paths.remove(path);
        }
    }

    pub fn insert(&mut self, path: impl Into<String>) {
        self.paths.insert(path.into());
    }

    /// Replaces the selection with every path currently known to `cache`.
    ///
    /// Only loaded listings count; directories never opened are selected as
    /// a whole and expanded at download time.
    pub fn select_all(&mut self, cache: &DirectoryCache) {
        self.paths = cache.known_paths().into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}
