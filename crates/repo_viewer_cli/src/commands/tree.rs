//! Lazily loaded directory tree.

use clap::Args;
use colored::Colorize;
use repo_viewer_core::{DirectoryCache, ExpandOutcome, TreeRow, ROOT_PATH};
use tracing::{instrument, warn};

use super::{info::size_label, AppContext};
use crate::errors::Error;

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Repository as `owner/repo` or a GitHub URL
    pub repository: String,

    /// Directory to open; parents are opened as needed. May be repeated.
    #[arg(short, long = "expand", value_name = "PATH")]
    pub expand: Vec<String>,

    /// Open every directory (one request per directory)
    #[arg(long)]
    pub all: bool,
}

#[instrument(skip(ctx))]
pub async fn execute(ctx: &AppContext, args: &TreeArgs) -> Result<(), Error> {
    let repo = ctx.open_repository(&args.repository)?;
    let cache = DirectoryCache::new(repo, ctx.gateway());
    cache.load_root().await?;

    if args.all {
        open_all(&cache).await;
    } else {
        for path in &args.expand {
            open_path(&cache, path).await?;
        }
    }

    print!("{}", render_rows(&cache.visible_rows()));
    Ok(())
}

/// Opens `path` and every directory above it.
///
/// Directories that are already open stay open.
pub async fn open_path(cache: &DirectoryCache, path: &str) -> Result<(), Error> {
    let path = normalize_path(path);
    for ancestor in ancestors(&path) {
        if cache.is_expanded(&ancestor) {
            continue;
        }
        match cache.expand(&ancestor).await? {
            ExpandOutcome::NotADirectory => {
                return Err(Error::InvalidArguments(format!(
                    "`{}` is a file, not a directory",
                    ancestor
                )))
            }
            ExpandOutcome::Expanded
            | ExpandOutcome::Collapsed
            | ExpandOutcome::AlreadyLoading => {}
        }
    }
    Ok(())
}

/// Loads the listings above `path` without opening anything, so the node
/// itself becomes known.
pub async fn load_ancestors(cache: &DirectoryCache, path: &str) {
    let path = normalize_path(path);
    let chain = ancestors(&path);
    let parents = &chain[..chain.len().saturating_sub(1)];
    for parent in parents {
        if let Err(e) = cache.ensure_children(parent).await {
            warn!(path = %parent, error = %e, "Failed to load parent directory");
            return;
        }
    }
}

async fn open_all(cache: &DirectoryCache) {
    let mut pending: Vec<String> = directories_below(cache, ROOT_PATH);
    while let Some(path) = pending.pop() {
        if cache.is_expanded(&path) {
            continue;
        }
        match cache.expand(&path).await {
            Ok(_) => pending.extend(directories_below(cache, &path)),
            Err(e) => warn!(path = %path, error = %e, "Skipping directory that failed to load"),
        }
    }
}

fn directories_below(cache: &DirectoryCache, path: &str) -> Vec<String> {
    cache
        .snapshot()
        .children(path)
        .unwrap_or_default()
        .into_iter()
        .filter(|n| n.kind.is_directory())
        .map(|n| n.path.clone())
        .collect()
}

/// Strips surrounding slashes and empty segments.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// `a/b/c` yields `a`, `a/b`, `a/b/c`.
fn ancestors(path: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        chain.push(current.clone());
    }
    chain
}

/// Formats tree rows with indentation and open/closed markers.
pub fn render_rows(rows: &[TreeRow]) -> String {
    let mut output = String::new();
    for row in rows {
        let indent = "  ".repeat(row.depth);
        if row.node.kind.is_directory() {
            let marker = if row.loading {
                "…"
            } else if row.expanded {
                "▾"
            } else {
                "▸"
            };
            output.push_str(&format!(
                "{}{} {}/\n",
                indent,
                marker,
                row.node.name.bold().blue()
            ));
        } else {
            output.push_str(&format!(
                "{}  {} {}\n",
                indent,
                row.node.name,
                size_label(row.node.size).dimmed()
            ));
        }
    }
    output
}
