//! In-memory gateway shared by the unit tests of this crate.

use async_trait::async_trait;
use bytes::Bytes;
use github_client::{ContentEntry, ContentGateway, EntryType, Error as GatewayError, Release};
use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

pub(crate) fn dir_entry(path: &str) -> ContentEntry {
    entry(path, EntryType::Dir, 0)
}

pub(crate) fn file_entry(path: &str, size: u64) -> ContentEntry {
    entry(path, EntryType::File, size)
}

fn entry(path: &str, entry_type: EntryType, size: u64) -> ContentEntry {
    ContentEntry {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: path.to_string(),
        entry_type,
        sha: format!("sha-{}", path),
        size,
    }
}

pub(crate) fn release(id: u64, tag: &str) -> Release {
    Release {
        id,
        tag_name: tag.to_string(),
        name: tag.to_string(),
        body: String::new(),
        published_at: "2024-01-01T00:00:00Z".to_string(),
        draft: false,
        prerelease: false,
        assets: vec![],
    }
}

/// One scripted answer to `list_releases`. `None` fails the call.
pub(crate) struct ReleaseScript {
    pub delay: Duration,
    pub releases: Option<Vec<Release>>,
}

#[derive(Default)]
pub(crate) struct MockGateway {
    directories: HashMap<String, Vec<ContentEntry>>,
    files: HashMap<String, Bytes>,
    failing_directories: HashSet<String>,
    failing_files: HashSet<String>,
    file_delay: Duration,
    list_delay: Duration,
    archive: Option<Bytes>,
    default_branch: Option<String>,
    releases: Mutex<VecDeque<ReleaseScript>>,

    pub list_calls: AtomicUsize,
    pub file_calls: AtomicUsize,
    pub branch_calls: AtomicUsize,
    pub release_calls: AtomicUsize,
    pub completed_release_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    requested_branches: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(mut self, path: &str, entries: Vec<ContentEntry>) -> Self {
        self.directories.insert(path.to_string(), entries);
        self
    }

    pub fn with_file(mut self, path: &str, content: &'static [u8]) -> Self {
        self.files
            .insert(path.to_string(), Bytes::from_static(content));
        self
    }

    pub fn with_failing_directory(mut self, path: &str) -> Self {
        self.failing_directories.insert(path.to_string());
        self
    }

    pub fn with_failing_file(mut self, path: &str) -> Self {
        self.failing_files.insert(path.to_string());
        self
    }

    pub fn with_file_delay(mut self, delay: Duration) -> Self {
        self.file_delay = delay;
        self
    }

    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    pub fn with_archive(mut self, archive: &'static [u8]) -> Self {
        self.archive = Some(Bytes::from_static(archive));
        self
    }

    pub fn with_default_branch(mut self, branch: &str) -> Self {
        self.default_branch = Some(branch.to_string());
        self
    }

    pub fn with_release_script(self, delay: Duration, releases: Option<Vec<Release>>) -> Self {
        self.releases
            .lock()
            .unwrap()
            .push_back(ReleaseScript { delay, releases });
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn requested_branches(&self) -> Vec<String> {
        self.requested_branches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGateway for MockGateway {
    async fn list_directory(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        if self.failing_directories.contains(path) {
            return Err(GatewayError::Transport("connection reset".to_string()));
        }
        self.directories
            .get(path)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn get_file(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<Bytes, GatewayError> {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_branches
            .lock()
            .unwrap()
            .push(branch.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.file_delay.is_zero() {
            tokio::time::sleep(self.file_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_files.contains(path) {
            return Err(GatewayError::Http { status: 500 });
        }
        Ok(self
            .files
            .get(path)
            .cloned()
            .unwrap_or_else(|| Bytes::from(format!("content of {}", path))))
    }

    async fn get_archive(
        &self,
        _owner: &str,
        _repo: &str,
        _branch: &str,
    ) -> Result<Bytes, GatewayError> {
        self.archive
            .clone()
            .ok_or(GatewayError::Timeout(Duration::from_secs(60)))
    }

    fn archive_url(&self, owner: &str, repo: &str, branch: &str) -> String {
        format!("https://api.example.test/repos/{owner}/{repo}/zipball/{branch}")
    }

    async fn list_releases(&self, _owner: &str, _repo: &str) -> Result<Vec<Release>, GatewayError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.releases.lock().unwrap().pop_front();
        let script = script.unwrap_or(ReleaseScript {
            delay: Duration::ZERO,
            releases: Some(vec![]),
        });
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        self.completed_release_calls.fetch_add(1, Ordering::SeqCst);
        script.releases.ok_or(GatewayError::RateLimitExceeded)
    }

    async fn default_branch(&self, _owner: &str, _repo: &str) -> Result<String, GatewayError> {
        self.branch_calls.fetch_add(1, Ordering::SeqCst);
        self.default_branch.clone().ok_or(GatewayError::NotFound)
    }
}
