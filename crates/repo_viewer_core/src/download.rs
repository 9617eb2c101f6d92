//! Selective and whole-repository downloads.

use async_trait::async_trait;
use bytes::Bytes;
use github_client::{ContentGateway, RepoRef, DEFAULT_BRANCH};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::OnceCell;
use tracing::{error, info, instrument, warn};

use crate::{
    archive::{archive_filename, ArchiveBuilder, DEFAULT_STORE_THRESHOLD},
    bulk_fetch::{resolve, BulkFetcher, DEFAULT_CONCURRENCY},
    clock::Clock,
    directory_cache::DirectoryCache,
    errors::Error,
    progress::{DownloadJob, JobPhase, ProgressSink},
    selection::SelectionSet,
};

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;

/// Tuning for selective downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Maximum concurrent file downloads
    pub concurrency: usize,

    /// File size in bytes above which an archive entry is not compressed
    pub store_threshold: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            store_threshold: DEFAULT_STORE_THRESHOLD,
        }
    }
}

/// Destination for finished archives.
#[async_trait]
pub trait ArchiveSink: Send + Sync {
    /// Stores `bytes` under `filename` and returns where it went.
    async fn save(&self, filename: &str, bytes: Bytes) -> Result<PathBuf, Error>;
}

/// Writes archives into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl ArchiveSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: Bytes) -> Result<PathBuf, Error> {
        let save_error = |e: std::io::Error| Error::Save {
            filename: filename.to_string(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(save_error)?;
        let target = self.directory.join(filename);
        tokio::fs::write(&target, &bytes).await.map_err(save_error)?;

        info!(path = %target.display(), bytes = bytes.len(), "Archive saved");
        Ok(target)
    }
}

/// Result of a selective download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub filename: String,
    pub location: PathBuf,
    /// Number of files in the archive
    pub archived: usize,
    pub archive_size: u64,
    /// Paths left out because their listing or download failed
    pub omitted: Vec<String>,
}

impl DownloadReport {
    pub fn is_complete(&self) -> bool {
        self.omitted.is_empty()
    }
}

/// Result of a whole-repository download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryDownload {
    /// The archive was fetched and saved.
    Saved {
        filename: String,
        location: PathBuf,
        size: u64,
    },
    /// The archive could not be fetched; the caller may open `url` instead.
    Fallback { url: String, reason: String },
}

/// Downloads parts of, or the whole of, one repository.
pub struct Downloader {
    gateway: Arc<dyn ContentGateway>,
    cache: Arc<DirectoryCache>,
    sink: Arc<dyn ArchiveSink>,
    clock: Arc<dyn Clock>,
    config: DownloadConfig,
    branch: OnceCell<String>,
}

impl Downloader {
    pub fn new(
        gateway: Arc<dyn ContentGateway>,
        cache: Arc<DirectoryCache>,
        sink: Arc<dyn ArchiveSink>,
        clock: Arc<dyn Clock>,
        config: DownloadConfig,
    ) -> Self {
        Self {
            gateway,
            cache,
            sink,
            clock,
            config,
            branch: OnceCell::new(),
        }
    }

    fn repo(&self) -> &RepoRef {
        self.cache.repository()
    }

    /// The repository's default branch, looked up once.
    ///
    /// A failed lookup falls back to `main`; the fallback is remembered too.
    pub async fn default_branch(&self) -> &str {
        self.branch
            .get_or_init(|| async {
                let repo = self.repo();
                match self.gateway.default_branch(&repo.owner, &repo.repo).await {
                    Ok(branch) => branch,
                    Err(e) => {
                        warn!(repo = %repo, error = %e, fallback = DEFAULT_BRANCH, "Failed to look up default branch");
                        DEFAULT_BRANCH.to_string()
                    }
                }
            })
            .await
    }

    /// Resolves, fetches, packages, and saves the selected paths.
    ///
    /// Files that fail to list or download are left out and named in the
    /// report. Fails when nothing is selected, when the selection holds no
    /// files, when every fetch fails, or when packaging or saving fails.
    #[instrument(skip_all, fields(repo = %self.repo(), selected = selection.len()))]
    pub async fn download_selected(
        &self,
        selection: &SelectionSet,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<DownloadReport, Error> {
        if selection.is_empty() {
            return Err(Error::NothingSelected);
        }

        progress.on_progress(&DownloadJob::resolving());
        let resolution = resolve(selection, &self.cache).await;
        if resolution.files.is_empty() {
            progress.on_progress(&DownloadJob::resolving().with_phase(JobPhase::Failed));
            return Err(Error::NoFiles);
        }

        let branch = self.default_branch().await.to_string();
        let files = Arc::new(resolution.files);
        progress.on_progress(&DownloadJob::fetching(files.clone(), 0, None));

        let fetcher = BulkFetcher::new(self.gateway.clone(), self.config.concurrency);
        let outcome = fetcher
            .fetch(self.repo(), &branch, files.clone(), progress.clone())
            .await;

        let last = DownloadJob::fetching(files.clone(), files.len(), None);
        if outcome.files.is_empty() {
            progress.on_progress(&last.with_phase(JobPhase::Failed));
            return Err(Error::NothingFetched {
                attempted: files.len(),
            });
        }
        progress.on_progress(&last.with_phase(JobPhase::Packaging));

        let archived = outcome.files.len();
        let builder = ArchiveBuilder::new(self.config.store_threshold);
        let fetched = outcome.files;
        let packaging_files = files.clone();
        let packaging_progress = progress.clone();
        let archive = tokio::task::spawn_blocking(move || {
            builder.build(&fetched, packaging_files, packaging_progress.as_ref())
        })
        .await
        .map_err(|e| Error::Packaging(format!("Packaging task failed: {}", e)))
        .and_then(|r| r);

        let archive = match archive {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "Failed to package archive");
                progress.on_progress(&last.with_phase(JobPhase::Failed));
                return Err(e);
            }
        };

        let filename = archive_filename(&self.repo().repo, self.clock.now());
        let archive_size = archive.len() as u64;
        progress.on_progress(&last.with_phase(JobPhase::Saving));
        let location = match self.sink.save(&filename, Bytes::from(archive)).await {
            Ok(location) => location,
            Err(e) => {
                progress.on_progress(&last.with_phase(JobPhase::Failed));
                return Err(e);
            }
        };
        progress.on_progress(&last.with_phase(JobPhase::Done));

        let mut omitted = resolution.omitted_directories;
        omitted.extend(outcome.failed);
        if !omitted.is_empty() {
            warn!(omitted = omitted.len(), "Archive is missing some selected content");
        }
        info!(filename = %filename, archived, archive_size, "Selective download complete");

        Ok(DownloadReport {
            filename,
            location,
            archived,
            archive_size,
            omitted,
        })
    }

    /// Downloads the host-built archive of the default branch.
    ///
    /// When the archive cannot be fetched the caller gets the archive URL to
    /// open instead. Only a failure to save the fetched archive is an error.
    #[instrument(skip_all, fields(repo = %self.repo()))]
    pub async fn download_repository(&self) -> Result<RepositoryDownload, Error> {
        let branch = self.default_branch().await.to_string();
        let repo = self.repo();

        let bytes = match self
            .gateway
            .get_archive(&repo.owner, &repo.repo, &branch)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                let url = self.gateway.archive_url(&repo.owner, &repo.repo, &branch);
                warn!(error = %e, url = %url, "Archive download failed; falling back to URL");
                return Ok(RepositoryDownload::Fallback {
                    url,
                    reason: e.to_string(),
                });
            }
        };

        let filename = archive_filename(&repo.repo, self.clock.now());
        let size = bytes.len() as u64;
        let location = self.sink.save(&filename, bytes).await?;
        Ok(RepositoryDownload::Saved {
            filename,
            location,
            size,
        })
    }
}
