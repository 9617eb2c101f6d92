//! Turning a selection into file contents.
//!
//! [`resolve`] expands selected directories into the files below them,
//! listing any directory not yet loaded. [`BulkFetcher`] then downloads those
//! files with a bounded number of workers. Individual failures are logged and
//! reported back; they never abort the batch.

use bytes::Bytes;
use github_client::{ContentGateway, RepoRef};
use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tokio::{sync::Mutex, task::JoinSet};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    directory_cache::DirectoryCache,
    progress::{DownloadJob, ProgressSink},
    selection::SelectionSet,
    tree::{NodeKind, TreeNode},
};

#[cfg(test)]
#[path = "bulk_fetch_tests.rs"]
mod tests;

/// Default number of concurrent file downloads.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// A file to download.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef {
    pub path: String,
    pub size: u64,
}

impl From<&TreeNode> for FileRef {
    fn from(node: &TreeNode) -> Self {
        Self {
            path: node.path.clone(),
            size: node.size,
        }
    }
}

/// The files a selection stands for.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Files in selection order, each path once
    pub files: Vec<FileRef>,
    /// Directories whose listing failed; their contents are missing from `files`
    pub omitted_directories: Vec<String>,
    /// Selected paths that are not part of the tree
    pub unknown: Vec<String>,
}

/// Expands `selection` into a de-duplicated list of files.
///
/// Selected paths are processed in sorted order. Directories are walked
/// depth first in display order, loading listings on demand. A directory
/// whose listing fails is recorded and skipped along with its subtree.
#[instrument(skip_all, fields(repo = %cache.repository(), selected = selection.len()))]
pub async fn resolve(selection: &SelectionSet, cache: &DirectoryCache) -> Resolution {
    let mut resolution = Resolution::default();
    let mut seen: HashSet<String> = HashSet::new();

    for path in selection.iter() {
        let Some(node) = cache.node(path) else {
            warn!(path, "Selected path is not in the tree; skipping");
            resolution.unknown.push(path.to_string());
            continue;
        };

        let mut pending = vec![node];
        while let Some(node) = pending.pop() {
            match node.kind {
                NodeKind::File => {
                    if seen.insert(node.path.clone()) {
                        resolution.files.push(FileRef::from(&node));
                    }
                }
                NodeKind::Directory => match cache.ensure_children(&node.path).await {
                    Ok(children) => pending.extend(children.into_iter().rev()),
                    Err(e) => {
                        warn!(path = %node.path, error = %e, "Failed to list directory; omitting its files");
                        if !resolution.omitted_directories.contains(&node.path) {
                            resolution.omitted_directories.push(node.path.clone());
                        }
                    }
                },
            }
        }
    }

    info!(
        files = resolution.files.len(),
        omitted = resolution.omitted_directories.len(),
        "Selection resolved"
    );
    resolution
}

/// Result of a bulk fetch.
#[derive(Debug, Default, Clone)]
pub struct FetchOutcome {
    /// Fetched files in the order they were requested
    pub files: Vec<(FileRef, Bytes)>,
    /// Paths whose download failed
    pub failed: Vec<String>,
}

/// Downloads many files from one branch with bounded concurrency.
#[derive(Clone)]
pub struct BulkFetcher {
    gateway: Arc<dyn ContentGateway>,
    concurrency: usize,
}

impl BulkFetcher {
    /// Creates a fetcher running at most `concurrency` downloads at once.
    /// A value of zero is treated as one.
    pub fn new(gateway: Arc<dyn ContentGateway>, concurrency: usize) -> Self {
        Self {
            gateway,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetches every file in `files` from `branch`.
    ///
    /// Runs `min(concurrency, files.len())` workers that pull from a shared
    /// queue. Progress is reported after each file, successful or not.
    #[instrument(skip(self, files, progress), fields(repo = %repo, files = files.len()))]
    pub async fn fetch(
        &self,
        repo: &RepoRef,
        branch: &str,
        files: Arc<Vec<FileRef>>,
        progress: Arc<dyn ProgressSink>,
    ) -> FetchOutcome {
        let total = files.len();
        if total == 0 {
            return FetchOutcome::default();
        }

        let queue: Arc<Mutex<VecDeque<(usize, FileRef)>>> =
            Arc::new(Mutex::new(files.iter().cloned().enumerate().collect()));
        let completed = Arc::new(AtomicUsize::new(0));
        let worker_count = self.concurrency.min(total);
        debug!(workers = worker_count, "Starting fetch workers");

        let mut workers = JoinSet::new();
        for _ in 0..worker_count {
            let worker = FetchWorker {
                gateway: self.gateway.clone(),
                owner: repo.owner.clone(),
                repo: repo.repo.clone(),
                branch: branch.to_string(),
                queue: queue.clone(),
                completed: completed.clone(),
                files: files.clone(),
                progress: progress.clone(),
            };
            workers.spawn(worker.run());
        }

        let mut results: Vec<(usize, FileRef, Option<Bytes>)> = Vec::with_capacity(total);
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(batch) => results.extend(batch),
                Err(e) => error!(error = %e, "Fetch worker terminated abnormally"),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);

        let mut outcome = FetchOutcome::default();
        let mut reported: HashSet<usize> = HashSet::with_capacity(total);
        for (index, file, content) in results {
            reported.insert(index);
            match content {
                Some(bytes) => outcome.files.push((file, bytes)),
                None => outcome.failed.push(file.path),
            }
        }
        // Items held by a worker that panicked never report back.
        for (index, file) in files.iter().enumerate() {
            if !reported.contains(&index) {
                outcome.failed.push(file.path.clone());
            }
        }

        if outcome.failed.is_empty() {
            info!(fetched = outcome.files.len(), "All files fetched");
        } else {
            warn!(
                fetched = outcome.files.len(),
                failed = outcome.failed.len(),
                "Some files could not be fetched"
            );
        }
        outcome
    }
}

struct FetchWorker {
    gateway: Arc<dyn ContentGateway>,
    owner: String,
    repo: String,
    branch: String,
    queue: Arc<Mutex<VecDeque<(usize, FileRef)>>>,
    completed: Arc<AtomicUsize>,
    files: Arc<Vec<FileRef>>,
    progress: Arc<dyn ProgressSink>,
}

impl FetchWorker {
    async fn run(self) -> Vec<(usize, FileRef, Option<Bytes>)> {
        let mut results = Vec::new();
        loop {
            let next = self.queue.lock().await.pop_front();
            let Some((index, file)) = next else {
                break;
            };

            let content = match self
                .gateway
                .get_file(&self.owner, &self.repo, &self.branch, &file.path)
                .await
            {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    error!(path = %file.path, error = %e, "Failed to fetch file");
                    None
                }
            };

            let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
            self.progress.on_progress(&DownloadJob::fetching(
                self.files.clone(),
                done,
                Some(file.path.clone()),
            ));
            results.push((index, file, content));
        }
        results
    }
}
