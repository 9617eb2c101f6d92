//! Engine behind the repository viewer.
//!
//! Holds the lazily loaded file tree of one repository, the user's selection,
//! and the download pipeline that resolves a selection into files, fetches
//! them with bounded concurrency, and packages them into a ZIP archive. Also
//! provides the release cache and the search history.
//!
//! All remote access goes through [`github_client::ContentGateway`].

pub mod archive;
pub mod bulk_fetch;
pub mod clock;
pub mod directory_cache;
pub mod download;
pub mod errors;
pub mod format;
pub mod history;
pub mod progress;
pub mod release_cache;
pub mod selection;
pub mod storage;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use archive::{archive_filename, ArchiveBuilder, DEFAULT_STORE_THRESHOLD};
pub use bulk_fetch::{resolve, BulkFetcher, FetchOutcome, FileRef, Resolution, DEFAULT_CONCURRENCY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use directory_cache::{DirectoryCache, ExpandOutcome, ExpansionState, TreeRow};
pub use download::{
    ArchiveSink, DirectorySink, DownloadConfig, DownloadReport, Downloader, RepositoryDownload,
};
pub use errors::Error;
pub use format::format_file_size;
pub use history::{SearchHistory, HISTORY_CAPACITY, HISTORY_KEY};
pub use progress::{DownloadJob, JobPhase, NoProgress, ProgressSink};
pub use release_cache::{
    cache_key, ReleaseCache, ReleaseCacheEntry, ReleaseSnapshot, ReleaseStatus,
    DEFAULT_RELEASE_TTL,
};
pub use selection::SelectionSet;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use tree::{sort_nodes, NodeKind, TreeArena, TreeNode, VisitedNode, ROOT_PATH};
