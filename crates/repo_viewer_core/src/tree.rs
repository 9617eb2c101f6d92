//! The lazily populated repository tree.
//!
//! Nodes live in a map keyed by repository path; each directory records the
//! ordered paths of its children once they are known. The root is the
//! directory with the empty path.

use github_client::ContentEntry;
use std::collections::HashMap;

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;

/// Path of the root node.
pub const ROOT_PATH: &str = "";

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    pub fn is_directory(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

/// One file or directory in the repository tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Last path segment; the repository name for the root
    pub name: String,

    /// Full path within the repository, unique per node
    pub path: String,

    pub kind: NodeKind,

    /// Size in bytes as reported by the listing (0 for directories)
    pub size: u64,

    /// Git object SHA from the listing, when known
    pub content_hash: Option<String>,

    /// Child paths in display order. `None` until the directory is listed.
    children: Option<Vec<String>>,
}

impl TreeNode {
    pub fn file(name: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
            size,
            content_hash: None,
            children: None,
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory,
            size: 0,
            content_hash: None,
            children: None,
        }
    }

    /// `true` once a directory's listing has been stored. Always `false` for files.
    pub fn is_resolved(&self) -> bool {
        self.children.is_some()
    }

    pub fn child_paths(&self) -> Option<&[String]> {
        self.children.as_deref()
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        let hash = hash.into();
        self.content_hash = (!hash.is_empty()).then_some(hash);
        self
    }
}

impl From<&ContentEntry> for TreeNode {
    fn from(entry: &ContentEntry) -> Self {
        let node = if entry.is_directory() {
            TreeNode::directory(&entry.name, &entry.path)
        } else {
            TreeNode::file(&entry.name, &entry.path, entry.size)
        };
        node.with_content_hash(&entry.sha)
    }
}

/// Sorts nodes for display: directories first, then by name.
pub fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| {
        b.kind
            .is_directory()
            .cmp(&a.kind.is_directory())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// A node paired with its depth below the walk's starting point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedNode<'a> {
    pub node: &'a TreeNode,
    pub depth: usize,
}

/// Path-indexed storage for the repository tree.
#[derive(Debug, Clone)]
pub struct TreeArena {
    nodes: HashMap<String, TreeNode>,
}

impl TreeArena {
    /// Creates a tree holding only an unresolved root directory.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_PATH.to_string(),
            TreeNode::directory(root_name, ROOT_PATH),
        );
        Self { nodes }
    }

    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        self.nodes.get(path)
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.get(ROOT_PATH)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of a resolved directory in display order.
    pub fn children(&self, path: &str) -> Option<Vec<&TreeNode>> {
        let node = self.nodes.get(path)?;
        let paths = node.children.as_ref()?;
        Some(paths.iter().filter_map(|p| self.nodes.get(p)).collect())
    }

    /// Stores the listing of `parent`, replacing any earlier one.
    ///
    /// Children that were already known keep their own resolved listings, so
    /// re-listing a directory does not drop what was loaded below it. Children
    /// that disappeared are removed with their subtrees. Returns `false` when
    /// `parent` is not a known directory.
    pub fn replace_children(&mut self, parent: &str, mut children: Vec<TreeNode>) -> bool {
        match self.nodes.get(parent) {
            Some(node) if node.kind.is_directory() => {}
            _ => return false,
        }

        sort_nodes(&mut children);
        let new_paths: Vec<String> = children.iter().map(|c| c.path.clone()).collect();

        let stale: Vec<String> = self
            .nodes
            .get(parent)
            .and_then(|n| n.children.as_ref())
            .map(|old| {
                old.iter()
                    .filter(|p| !new_paths.contains(p))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        for path in stale {
            self.remove_subtree(&path);
        }

        for mut child in children {
            let existing = self
                .nodes
                .get(&child.path)
                .map(|e| (e.kind, e.children.clone()));
            match existing {
                Some((kind, children)) if kind == child.kind => child.children = children,
                Some(_) => self.remove_subtree(&child.path),
                None => {}
            }
            self.nodes.insert(child.path.clone(), child);
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children = Some(new_paths);
        }
        true
    }

    fn remove_subtree(&mut self, path: &str) {
        let mut pending = vec![path.to_string()];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                if let Some(children) = node.children {
                    pending.extend(children);
                }
            }
        }
    }

    /// Walks the subtree below `start` depth first, in display order.
    ///
    /// `descend` decides whether the children of a resolved directory are
    /// visited. The starting node itself is not yielded.
    pub fn walk<F>(&self, start: &str, mut descend: F) -> Vec<VisitedNode<'_>>
    where
        F: FnMut(&TreeNode) -> bool,
    {
        let mut visited = Vec::new();
        let mut stack: Vec<(&TreeNode, usize)> = Vec::new();

        if let Some(children) = self.children(start) {
            stack.extend(children.into_iter().rev().map(|c| (c, 0)));
        }

        while let Some((node, depth)) = stack.pop() {
            visited.push(VisitedNode { node, depth });
            if node.kind.is_directory() && descend(node) {
                if let Some(children) = self.children(&node.path) {
                    stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
                }
            }
        }

        visited
    }

    /// Every known path below the root, depth first.
    pub fn known_paths(&self) -> Vec<String> {
        self.walk(ROOT_PATH, |_| true)
            .into_iter()
            .map(|v| v.node.path.clone())
            .collect()
    }
}
