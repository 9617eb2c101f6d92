//! ZIP packaging of fetched files.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    io::{Cursor, Write},
    sync::Arc,
};
use tracing::{debug, instrument};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    bulk_fetch::FileRef,
    errors::Error,
    progress::{DownloadJob, ProgressSink},
};

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;

/// File size above which an entry is stored uncompressed.
pub const DEFAULT_STORE_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Name of the archive for `repo` built at `at`: `{repo}_{YYYYMMDD}.zip`.
pub fn archive_filename(repo: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.zip", repo, at.format("%Y%m%d"))
}

/// Builds in-memory ZIP archives.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveBuilder {
    store_threshold: u64,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_THRESHOLD)
    }
}

impl ArchiveBuilder {
    pub fn new(store_threshold: u64) -> Self {
        Self { store_threshold }
    }

    /// Compression used for a file of `size` bytes.
    ///
    /// Files above the threshold are stored; everything else is deflated.
    pub fn compression_for(&self, size: u64) -> CompressionMethod {
        if size > self.store_threshold {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        }
    }

    /// Writes `files` into a ZIP archive, one entry per repository path.
    ///
    /// `resolved` is the job's file list, passed through to progress updates,
    /// which move from 50 to 100 percent as entries are written. This is CPU
    /// bound; async callers should run it on a blocking thread.
    #[instrument(skip_all, fields(entries = files.len()))]
    pub fn build(
        &self,
        files: &[(FileRef, Bytes)],
        resolved: Arc<Vec<FileRef>>,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<u8>, Error> {
        let total_bytes: u64 = files.iter().map(|(_, content)| content.len() as u64).sum();
        debug!(total_bytes, "Packaging archive");

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (written, (file, content)) in files.iter().enumerate() {
            let size = content.len() as u64;
            let options = SimpleFileOptions::default()
                .compression_method(self.compression_for(size))
                .large_file(size > u32::MAX as u64);
            writer.start_file(file.path.as_str(), options)?;
            writer.write_all(content).map_err(|e| {
                Error::Packaging(format!("Failed to write `{}`: {}", file.path, e))
            })?;

            progress.on_progress(&DownloadJob::packaging(
                resolved.clone(),
                written + 1,
                files.len(),
                Some(file.path.clone()),
            ));
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}
