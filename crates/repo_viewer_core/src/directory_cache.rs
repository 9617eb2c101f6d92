//! Lazy directory loading for one repository.
//!
//! The cache owns the [`TreeArena`] and the expansion state. Directory
//! listings are fetched at most once on demand and spliced into the tree under
//! a single write lock, so readers see either the old or the new listing.

use github_client::{ContentGateway, RepoRef};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, RwLock},
};
use tokio::sync::Notify;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    errors::Error,
    tree::{NodeKind, TreeArena, TreeNode, ROOT_PATH},
};

#[cfg(test)]
#[path = "directory_cache_tests.rs"]
mod tests;

/// Which directories are open and which are being loaded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpansionState {
    pub expanded: HashSet<String>,
    pub loading: HashSet<String>,
}

/// Result of [`DirectoryCache::expand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// The directory is now open.
    Expanded,
    /// The directory was open and has been closed.
    Collapsed,
    /// A load for this directory is already running; nothing was done.
    AlreadyLoading,
    /// The path is a file.
    NotADirectory,
}

/// One row of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub node: TreeNode,
    pub depth: usize,
    pub expanded: bool,
    pub loading: bool,
}

/// Tree of one repository, filled in as directories are opened.
pub struct DirectoryCache {
    repo: RepoRef,
    gateway: Arc<dyn ContentGateway>,
    tree: RwLock<TreeArena>,
    state: Mutex<ExpansionState>,
    /// Signalled whenever a directory load finishes, successfully or not
    listed: Notify,
}

impl DirectoryCache {
    pub fn new(repo: RepoRef, gateway: Arc<dyn ContentGateway>) -> Self {
        let root_name = repo.repo.clone();
        Self {
            repo,
            gateway,
            tree: RwLock::new(TreeArena::new(root_name)),
            state: Mutex::new(ExpansionState::default()),
            listed: Notify::new(),
        }
    }

    pub fn repository(&self) -> &RepoRef {
        &self.repo
    }

    /// Lists the repository root and opens it.
    ///
    /// Unlike [`expand`](Self::expand), this always refetches, replacing the
    /// root listing while keeping deeper listings that are still present.
    #[instrument(skip(self), fields(repo = %self.repo))]
    pub async fn load_root(&self) -> Result<Vec<TreeNode>, Error> {
        let children = self.fetch_children(ROOT_PATH).await?;
        self.with_state(|s| {
            s.expanded.insert(ROOT_PATH.to_string());
        });
        info!(entries = children.len(), "Repository root loaded");
        Ok(children)
    }

    /// Toggles a directory open or closed, loading its listing on first open.
    ///
    /// A failed load leaves the directory closed and unresolved, so the next
    /// call retries.
    #[instrument(skip(self), fields(repo = %self.repo))]
    pub async fn expand(&self, path: &str) -> Result<ExpandOutcome, Error> {
        let node = self
            .node(path)
            .ok_or_else(|| Error::UnknownPath(path.to_string()))?;

        if node.kind != NodeKind::Directory {
            return Ok(ExpandOutcome::NotADirectory);
        }

        if node.is_resolved() {
            let expanded = self.with_state(|s| {
                if s.expanded.remove(path) {
                    false
                } else {
                    s.expanded.insert(path.to_string());
                    true
                }
            });
            debug!(expanded, "Toggled resolved directory");
            return Ok(if expanded {
                ExpandOutcome::Expanded
            } else {
                ExpandOutcome::Collapsed
            });
        }

        let started = self.with_state(|s| s.loading.insert(path.to_string()));
        if !started {
            debug!("Directory is already loading");
            return Ok(ExpandOutcome::AlreadyLoading);
        }

        let result = self.fetch_children(path).await;
        self.with_state(|s| {
            s.loading.remove(path);
            if result.is_ok() {
                s.expanded.insert(path.to_string());
            }
        });
        self.listed.notify_waiters();

        match result {
            Ok(_) => Ok(ExpandOutcome::Expanded),
            Err(e) => {
                error!(path, error = %e, "Failed to load directory");
                Err(e)
            }
        }
    }

    /// Returns the children of a directory, fetching them if not yet known.
    ///
    /// Does not change the expansion state. When the directory is already
    /// being loaded, waits for that load instead of listing it again.
    pub async fn ensure_children(&self, path: &str) -> Result<Vec<TreeNode>, Error> {
        loop {
            // Created before the state check so a load finishing in between
            // still wakes this caller.
            let listed = self.listed.notified();

            if let Some(children) = self.known_children(path)? {
                return Ok(children);
            }

            let started = self.with_state(|s| s.loading.insert(path.to_string()));
            if started {
                let result = self.fetch_children(path).await;
                self.with_state(|s| {
                    s.loading.remove(path);
                });
                self.listed.notify_waiters();
                return result;
            }

            debug!(path, "Waiting for listing already in flight");
            listed.await;
        }
    }

    fn known_children(&self, path: &str) -> Result<Option<Vec<TreeNode>>, Error> {
        let tree = self.read_tree();
        match tree.get(path) {
            None => Err(Error::UnknownPath(path.to_string())),
            Some(node) if node.kind != NodeKind::Directory => Ok(Some(Vec::new())),
            Some(_) => Ok(tree
                .children(path)
                .map(|c| c.into_iter().cloned().collect())),
        }
    }

    /// Closes a directory without discarding its listing.
    pub fn collapse(&self, path: &str) {
        self.with_state(|s| {
            s.expanded.remove(path);
        });
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.with_state(|s| s.expanded.contains(path))
    }

    pub fn is_loading(&self, path: &str) -> bool {
        self.with_state(|s| s.loading.contains(path))
    }

    pub fn node(&self, path: &str) -> Option<TreeNode> {
        self.read_tree().get(path).cloned()
    }

    /// Every known path below the root, depth first in display order.
    pub fn known_paths(&self) -> Vec<String> {
        self.read_tree().known_paths()
    }

    /// A copy of the current tree.
    pub fn snapshot(&self) -> TreeArena {
        self.read_tree().clone()
    }

    pub fn expansion_state(&self) -> ExpansionState {
        self.with_state(|s| s.clone())
    }

    /// The rows a tree view shows: every node whose ancestors are all open.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        let state = self.expansion_state();
        let tree = self.read_tree();
        if !state.expanded.contains(ROOT_PATH) {
            return Vec::new();
        }

        tree.walk(ROOT_PATH, |node| state.expanded.contains(&node.path))
            .into_iter()
            .map(|visited| TreeRow {
                expanded: state.expanded.contains(&visited.node.path),
                loading: state.loading.contains(&visited.node.path),
                node: visited.node.clone(),
                depth: visited.depth,
            })
            .collect()
    }

    async fn fetch_children(&self, path: &str) -> Result<Vec<TreeNode>, Error> {
        let entries = self
            .gateway
            .list_directory(&self.repo.owner, &self.repo.repo, path)
            .await?;

        let children: Vec<TreeNode> = entries.iter().map(TreeNode::from).collect();
        {
            let mut tree = self.tree.write().unwrap_or_else(|e| e.into_inner());
            if !tree.replace_children(path, children) {
                warn!(path, "Listed directory is no longer part of the tree");
                return Err(Error::UnknownPath(path.to_string()));
            }
        }

        let tree = self.read_tree();
        let stored = tree
            .children(path)
            .map(|c| c.into_iter().cloned().collect())
            .unwrap_or_default();
        debug!(path, entries = entries.len(), "Directory listing stored");
        Ok(stored)
    }

    fn read_tree(&self) -> std::sync::RwLockReadGuard<'_, TreeArena> {
        self.tree.read().unwrap_or_else(|e| e.into_inner())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ExpansionState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }
}
