//! Command modules for the repository viewer CLI.
//!
//! - `info`: repository metadata, README and license
//! - `tree`: lazily loaded directory tree
//! - `download`: selective or whole-repository ZIP download
//! - `releases`: cached release list
//! - `history`: recently viewed repositories
//! - `rate_limit`: remaining API quota

use std::sync::Arc;

use github_client::{ContentGateway, GitHubClient, RepoRef};
use repo_viewer_core::{FileStore, KeyValueStore, SearchHistory};
use tracing::{debug, warn};

use crate::config::{AppConfig, TOKEN_ENV_VAR};
use crate::errors::Error;

pub mod download;
pub mod history;
pub mod info;
pub mod rate_limit;
pub mod releases;
pub mod tree;

#[cfg(test)]
mod test_support;

/// Shared services for one CLI invocation.
pub struct AppContext {
    pub config: AppConfig,
    pub client: Arc<GitHubClient>,
    pub store: Arc<dyn KeyValueStore>,
}

impl AppContext {
    /// Builds the GitHub client and opens the persistent store.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let token = config.resolve_token(std::env::var(TOKEN_ENV_VAR).ok());
        let client = GitHubClient::from_config(config.client_config(), token.as_deref())?;
        let store_path = config.store_path();
        debug!(store = %store_path.display(), "Opening persistent store");

        Ok(Self {
            client: Arc::new(client),
            store: Arc::new(FileStore::new(store_path)),
            config,
        })
    }

    pub fn gateway(&self) -> Arc<dyn ContentGateway> {
        self.client.clone()
    }

    pub fn history(&self) -> SearchHistory {
        SearchHistory::new(self.store.clone())
    }

    /// Parses a repository argument and records it in the search history.
    pub fn open_repository(&self, input: &str) -> Result<RepoRef, Error> {
        let repo = RepoRef::parse(input)?;
        if let Err(e) = self.history().record(&repo.to_string()) {
            warn!(error = %e, "Failed to update search history");
        }
        Ok(repo)
    }
}
