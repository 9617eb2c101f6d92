//! Progress snapshots for selective downloads and the sink that receives them.

use std::sync::Arc;

use crate::bulk_fetch::FileRef;

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;

/// Stage of a selective download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Resolving,
    Fetching,
    Packaging,
    Saving,
    Done,
    Failed,
}

/// Snapshot of a running download, handed to a [`ProgressSink`].
///
/// Fetching covers 0-50 percent and packaging 50-100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub phase: JobPhase,
    pub resolved_files: Arc<Vec<FileRef>>,
    pub completed_count: usize,
    pub total_count: usize,
    pub percent: u8,
    /// Path most recently finished, if any
    pub current: Option<String>,
}

impl DownloadJob {
    pub fn resolving() -> Self {
        Self {
            phase: JobPhase::Resolving,
            resolved_files: Arc::new(Vec::new()),
            completed_count: 0,
            total_count: 0,
            percent: 0,
            current: None,
        }
    }

    pub fn fetching(files: Arc<Vec<FileRef>>, completed: usize, current: Option<String>) -> Self {
        let total = files.len();
        Self {
            phase: JobPhase::Fetching,
            resolved_files: files,
            completed_count: completed,
            total_count: total,
            percent: scaled_percent(0, completed, total),
            current,
        }
    }

    pub fn packaging(
        files: Arc<Vec<FileRef>>,
        written: usize,
        total: usize,
        current: Option<String>,
    ) -> Self {
        Self {
            phase: JobPhase::Packaging,
            resolved_files: files,
            completed_count: written,
            total_count: total,
            percent: scaled_percent(50, written, total),
            current,
        }
    }

    /// Returns a copy in `phase`, keeping the counters.
    pub fn with_phase(&self, phase: JobPhase) -> Self {
        let percent = match phase {
            JobPhase::Done | JobPhase::Saving => 100,
            JobPhase::Resolving => 0,
            _ => self.percent,
        };
        Self {
            phase,
            percent,
            ..self.clone()
        }
    }
}

/// Maps `completed / total` onto the half of the bar starting at `base`.
fn scaled_percent(base: u8, completed: usize, total: usize) -> u8 {
    if total == 0 {
        return base + 50;
    }
    let half = (completed.min(total) * 50 + total / 2) / total;
    base + half as u8
}

/// Receives progress of long-running downloads.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, job: &DownloadJob);
}

/// A sink that ignores all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _job: &DownloadJob) {}
}
