//! Two-tier cache of repository releases.
//!
//! Lookups are served from memory when fresh, otherwise from the persistent
//! store when fresh while a background fetch refreshes both tiers. Entries
//! older than the freshness window in either tier are misses.
//! Only the newest fetch per repository may publish its result; an older one
//! still in flight is aborted and its late result ignored.
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use repo_viewer_core::{ReleaseCache, MemoryStore, SystemClock};
//! # async fn example(gateway: Arc<dyn github_client::ContentGateway>) {
//! let cache = ReleaseCache::new(gateway, Arc::new(MemoryStore::new()), Arc::new(SystemClock));
//!
//! cache.get("rust-lang", "rust");
//! let snapshot = cache.wait("rust-lang", "rust").await;
//! println!("{} releases", snapshot.releases.len());
//! # }
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use github_client::{ContentGateway, Error as GatewayError, Release};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{sync::watch, task::AbortHandle};
use tracing::{debug, info, warn};

use crate::{clock::Clock, errors::Error, storage::KeyValueStore};

#[cfg(test)]
#[path = "release_cache_tests.rs"]
mod tests;

/// How long cached releases count as fresh.
pub const DEFAULT_RELEASE_TTL: Duration = Duration::from_secs(10 * 60);

/// Storage key for the releases of `owner/repo`.
pub fn cache_key(owner: &str, repo: &str) -> String {
    format!("releases_cache:{}/{}", owner, repo)
}

/// Cached releases with the time they were fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCacheEntry {
    #[serde(rename = "ts", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "data")]
    pub releases: Vec<Release>,
}

impl ReleaseCacheEntry {
    /// Parses a stored entry.
    pub fn decode(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(|e| Error::Decode(format!("release cache entry: {}", e)))
    }

    fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.timestamp) <= ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStatus {
    /// Nothing requested yet
    Idle,
    /// A fetch is running and no cached data is available
    Loading,
    Success,
    Error,
}

/// What a viewer of the release list sees at one moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSnapshot {
    pub status: ReleaseStatus,
    pub releases: Vec<Release>,
    pub error: Option<String>,
    /// A fetch is in flight, possibly behind cached data
    pub refreshing: bool,
}

impl ReleaseSnapshot {
    fn idle() -> Self {
        Self {
            status: ReleaseStatus::Idle,
            releases: Vec::new(),
            error: None,
            refreshing: false,
        }
    }

    fn loading() -> Self {
        Self {
            status: ReleaseStatus::Loading,
            ..Self::idle()
        }
    }

    fn success(releases: Vec<Release>) -> Self {
        Self {
            status: ReleaseStatus::Success,
            releases,
            error: None,
            refreshing: false,
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: ReleaseStatus::Error,
            releases: Vec::new(),
            error: Some(message),
            refreshing: false,
        }
    }
}

fn to_time_delta(ttl: Duration) -> TimeDelta {
    TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX)
}

struct KeyState {
    sender: watch::Sender<ReleaseSnapshot>,
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl KeyState {
    fn new() -> Self {
        let (sender, _) = watch::channel(ReleaseSnapshot::idle());
        Self {
            sender,
            generation: 0,
            in_flight: None,
        }
    }
}

struct Inner {
    gateway: Arc<dyn ContentGateway>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    memory: Mutex<HashMap<String, ReleaseCacheEntry>>,
    keys: Mutex<HashMap<String, KeyState>>,
}

/// Stale-while-revalidate cache of release lists.
///
/// Cloning is cheap and clones share state. Must be used inside a Tokio
/// runtime: fetches run as spawned tasks.
#[derive(Clone)]
pub struct ReleaseCache {
    inner: Arc<Inner>,
}

impl ReleaseCache {
    /// A cache using [`DEFAULT_RELEASE_TTL`].
    pub fn new(
        gateway: Arc<dyn ContentGateway>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_ttl(gateway, store, clock, DEFAULT_RELEASE_TTL)
    }

    /// A cache whose entries stay fresh for `ttl`.
    pub fn with_ttl(
        gateway: Arc<dyn ContentGateway>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                store,
                clock,
                ttl: to_time_delta(ttl),
                memory: Mutex::new(HashMap::new()),
                keys: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns what is known now and starts a refresh when needed.
    ///
    /// * Fresh in memory: returned as is, no fetch.
    /// * Fresh in the store: returned, and a background fetch replaces it.
    /// * Nothing fresh cached: `Loading`, with the fetch running.
    pub fn get(&self, owner: &str, repo: &str) -> ReleaseSnapshot {
        let key = cache_key(owner, repo);
        let now = self.inner.clock.now();

        let fresh = self
            .inner
            .lock_memory()
            .get(&key)
            .filter(|entry| entry.is_fresh(now, self.inner.ttl))
            .map(|entry| entry.releases.clone());
        if let Some(releases) = fresh {
            debug!(key = %key, "Releases served from memory");
            let snapshot = ReleaseSnapshot::success(releases);
            self.inner.publish_cached(&key, snapshot.clone());
            return snapshot;
        }

        let stored = self
            .inner
            .load_stored(&key)
            .filter(|entry| entry.is_fresh(now, self.inner.ttl));
        let snapshot = match stored {
            Some(entry) => {
                debug!(key = %key, fetched_at = %entry.timestamp, "Releases served from store");
                ReleaseSnapshot::success(entry.releases)
            }
            None => ReleaseSnapshot::loading(),
        };
        self.start_fetch(key, owner, repo, snapshot)
    }

    /// Drops both cache tiers for the repository and fetches again.
    pub fn refresh(&self, owner: &str, repo: &str) -> ReleaseSnapshot {
        let key = cache_key(owner, repo);
        self.inner.lock_memory().remove(&key);
        if let Err(e) = self.inner.store.remove(&key) {
            warn!(key = %key, error = %e, "Failed to clear stored releases");
        }
        info!(key = %key, "Release cache cleared; refetching");

        self.start_fetch(key, owner, repo, ReleaseSnapshot::loading())
    }

    /// Receives every state change for the repository.
    pub fn subscribe(&self, owner: &str, repo: &str) -> watch::Receiver<ReleaseSnapshot> {
        let key = cache_key(owner, repo);
        self.inner
            .lock_keys()
            .entry(key)
            .or_insert_with(KeyState::new)
            .sender
            .subscribe()
    }

    /// Waits until the repository's state is no longer `Loading`.
    pub async fn wait(&self, owner: &str, repo: &str) -> ReleaseSnapshot {
        let mut receiver = self.subscribe(owner, repo);
        let result = receiver
            .wait_for(|s| s.status != ReleaseStatus::Loading)
            .await
            .map(|s| s.clone());
        match result {
            Ok(snapshot) => snapshot,
            Err(_) => receiver.borrow().clone(),
        }
    }

    /// Waits until no fetch is in flight for the repository.
    ///
    /// Unlike [`wait`](Self::wait) this also covers background refreshes
    /// running behind cached data.
    pub async fn settled(&self, owner: &str, repo: &str) -> ReleaseSnapshot {
        let mut receiver = self.subscribe(owner, repo);
        let result = receiver.wait_for(|s| !s.refreshing).await.map(|s| s.clone());
        match result {
            Ok(snapshot) => snapshot,
            Err(_) => receiver.borrow().clone(),
        }
    }

    fn start_fetch(
        &self,
        key: String,
        owner: &str,
        repo: &str,
        mut initial: ReleaseSnapshot,
    ) -> ReleaseSnapshot {
        let mut keys = self.inner.lock_keys();
        let state = keys.entry(key.clone()).or_insert_with(KeyState::new);

        if let Some(previous) = state.in_flight.take() {
            debug!(key = %key, "Aborting superseded release fetch");
            previous.abort();
        }
        state.generation += 1;
        let generation = state.generation;
        initial.refreshing = true;
        state.sender.send_replace(initial.clone());

        let inner = self.inner.clone();
        let owner = owner.to_string();
        let repo = repo.to_string();
        let task = tokio::spawn(async move {
            let result = inner.gateway.list_releases(&owner, &repo).await;
            inner.complete(&key, generation, result);
        });
        state.in_flight = Some(task.abort_handle());
        initial
    }
}

impl Inner {
    fn lock_memory(&self) -> std::sync::MutexGuard<'_, HashMap<String, ReleaseCacheEntry>> {
        self.memory.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_keys(&self) -> std::sync::MutexGuard<'_, HashMap<String, KeyState>> {
        self.keys.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load_stored(&self, key: &str) -> Option<ReleaseCacheEntry> {
        let raw = self.store.get(key)?;
        match ReleaseCacheEntry::decode(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key, error = %e, "Discarding stored releases");
                if let Err(e) = self.store.remove(key) {
                    warn!(key, error = %e, "Failed to discard corrupt release cache");
                }
                None
            }
        }
    }

    /// Publishes a memory hit without disturbing a fetch in progress.
    fn publish_cached(&self, key: &str, snapshot: ReleaseSnapshot) {
        let mut keys = self.lock_keys();
        let state = keys.entry(key.to_string()).or_insert_with(KeyState::new);
        if state.in_flight.is_none() {
            state.sender.send_replace(snapshot);
        }
    }

    fn complete(&self, key: &str, generation: u64, result: Result<Vec<Release>, GatewayError>) {
        let mut keys = self.lock_keys();
        let Some(state) = keys.get_mut(key) else {
            return;
        };
        if state.generation != generation {
            debug!(key, generation, "Ignoring result of superseded release fetch");
            return;
        }
        state.in_flight = None;

        match result {
            Ok(releases) => {
                let entry = ReleaseCacheEntry {
                    timestamp: self.clock.now(),
                    releases,
                };
                match serde_json::to_string(&entry) {
                    Ok(raw) => {
                        if let Err(e) = self.store.set(key, &raw) {
                            warn!(key, error = %e, "Failed to persist releases");
                        }
                    }
                    Err(e) => warn!(key, error = %e, "Failed to encode releases"),
                }
                info!(key, releases = entry.releases.len(), "Releases refreshed");
                state
                    .sender
                    .send_replace(ReleaseSnapshot::success(entry.releases.clone()));
                self.lock_memory().insert(key.to_string(), entry);
            }
            Err(e) => {
                let showing_cached = state.sender.borrow().status == ReleaseStatus::Success;
                if showing_cached {
                    warn!(key, error = %e, "Background release refresh failed; keeping cached data");
                    state.sender.send_modify(|s| s.refreshing = false);
                } else {
                    warn!(key, error = %e, "Failed to fetch releases");
                    state
                        .sender
                        .send_replace(ReleaseSnapshot::error(e.to_string()));
                }
            }
        }
    }
}
