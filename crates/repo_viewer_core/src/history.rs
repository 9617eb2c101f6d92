//! Recently viewed repositories, kept in the persistent store.

use std::sync::Arc;
use tracing::warn;

use crate::{errors::Error, storage::KeyValueStore};

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;

/// Storage key of the search history.
pub const HISTORY_KEY: &str = "repo_history";

/// Number of entries kept.
pub const HISTORY_CAPACITY: usize = 8;

/// Most-recent-first list of repositories the user looked at.
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
}

impl SearchHistory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored entries, newest first. Unreadable history is empty.
    pub fn entries(&self) -> Vec<String> {
        let Some(raw) = self.store.get(HISTORY_KEY) else {
            return Vec::new();
        };
        decode_entries(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable search history");
            Vec::new()
        })
    }

    /// Moves `entry` to the front, dropping the oldest beyond capacity.
    pub fn record(&self, entry: &str) -> Result<Vec<String>, Error> {
        let entry = entry.trim();
        let mut entries = self.entries();
        if entry.is_empty() {
            return Ok(entries);
        }

        entries.retain(|e| e != entry);
        entries.insert(0, entry.to_string());
        entries.truncate(HISTORY_CAPACITY);

        self.save(&entries)?;
        Ok(entries)
    }

    pub fn remove(&self, entry: &str) -> Result<Vec<String>, Error> {
        let mut entries = self.entries();
        entries.retain(|e| e != entry);
        self.save(&entries)?;
        Ok(entries)
    }

    pub fn clear(&self) -> Result<(), Error> {
        self.store.remove(HISTORY_KEY)
    }

    fn save(&self, entries: &[String]) -> Result<(), Error> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| Error::Storage(format!("Failed to encode history: {}", e)))?;
        self.store.set(HISTORY_KEY, &raw)
    }
}

fn decode_entries(raw: &str) -> Result<Vec<String>, Error> {
    serde_json::from_str(raw).map_err(|e| Error::Decode(format!("search history: {}", e)))
}
