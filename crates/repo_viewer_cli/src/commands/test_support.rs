//! Fixed-content gateway for command tests.

use async_trait::async_trait;
use bytes::Bytes;
use github_client::{ContentEntry, ContentGateway, EntryType, Error as GatewayError, Release};
use std::collections::HashMap;

/// Serves fixed directory listings. Files read back as `content of {path}`,
/// archives are unavailable.
pub struct ListingGateway {
    listings: HashMap<String, Vec<ContentEntry>>,
}

impl ListingGateway {
    /// `listings` maps a directory to its `(path, is_directory)` entries.
    pub fn new(listings: &[(&str, &[(&str, bool)])]) -> Self {
        let listings = listings
            .iter()
            .map(|(dir, entries)| {
                let entries = entries
                    .iter()
                    .map(|(path, is_dir)| ContentEntry {
                        name: path.rsplit('/').next().unwrap_or(path).to_string(),
                        path: path.to_string(),
                        entry_type: if *is_dir { EntryType::Dir } else { EntryType::File },
                        sha: String::new(),
                        size: if *is_dir { 0 } else { 2048 },
                    })
                    .collect();
                (dir.to_string(), entries)
            })
            .collect();
        Self { listings }
    }

    /// A small repository used across the command tests.
    pub fn sample() -> Self {
        Self::new(&[
            ("", &[("src", true), ("README.md", false)]),
            ("src", &[("src/bin", true), ("src/lib.rs", false)]),
            ("src/bin", &[("src/bin/main.rs", false)]),
        ])
    }
}

#[async_trait]
impl ContentGateway for ListingGateway {
    async fn list_directory(
        &self,
        _owner: &str,
        _repo: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>, GatewayError> {
        self.listings.get(path).cloned().ok_or(GatewayError::NotFound)
    }

    async fn get_file(
        &self,
        _owner: &str,
        _repo: &str,
        _branch: &str,
        path: &str,
    ) -> Result<Bytes, GatewayError> {
        Ok(Bytes::from(format!("content of {}", path)))
    }

    async fn get_archive(
        &self,
        _owner: &str,
        _repo: &str,
        _branch: &str,
    ) -> Result<Bytes, GatewayError> {
        Err(GatewayError::NotFound)
    }

    fn archive_url(&self, owner: &str, repo: &str, branch: &str) -> String {
        format!("https://example.test/{owner}/{repo}/{branch}.zip")
    }

    async fn list_releases(&self, _owner: &str, _repo: &str) -> Result<Vec<Release>, GatewayError> {
        Ok(vec![])
    }

    async fn default_branch(&self, _owner: &str, _repo: &str) -> Result<String, GatewayError> {
        Ok("main".to_string())
    }
}
