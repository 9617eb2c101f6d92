//! # Models
//!
//! This module contains the data models the viewer reads from the GitHub API:
//! repository summaries, releases with their assets, license information and
//! rate limit status.
//!
//! GitHub leaves several of these fields `null` depending on the state of the
//! entity (drafts have no publish date, releases may be unnamed). The raw
//! payloads are normalised on deserialization so callers never have to deal
//! with the gaps.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Summary of a repository as shown on the overview tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRepository")]
pub struct RepositorySummary {
    /// Login of the owning user or organization
    pub owner: String,
    /// Repository name without the owner
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    /// Free-form description, empty when unset
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    /// Branch used for archive downloads and README lookups
    pub default_branch: String,
    /// Project homepage, empty when unset
    pub homepage: String,
    pub license: Option<LicenseInfo>,
    pub clone_url: String,
    pub ssh_url: String,
    pub created_at: String,
    pub updated_at: String,
}

/// License identification attached to a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    name: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    owner: Option<RawOwner>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: Option<u64>,
    #[serde(default)]
    forks_count: Option<u64>,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    license: Option<LicenseInfo>,
    #[serde(default)]
    clone_url: Option<String>,
    #[serde(default)]
    ssh_url: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<RawRepository> for RepositorySummary {
    fn from(value: RawRepository) -> Self {
        let owner = value.owner.map(|o| o.login).unwrap_or_default();
        let full_name = value
            .full_name
            .unwrap_or_else(|| format!("{}/{}", owner, value.name));
        Self {
            clone_url: value
                .clone_url
                .unwrap_or_else(|| format!("https://github.com/{}.git", full_name)),
            ssh_url: value
                .ssh_url
                .unwrap_or_else(|| format!("git@github.com:{}.git", full_name)),
            owner,
            name: value.name,
            full_name,
            description: value.description.unwrap_or_default(),
            stars: value.stargazers_count.unwrap_or(0),
            forks: value.forks_count.unwrap_or(0),
            default_branch: value
                .default_branch
                .unwrap_or_else(|| crate::DEFAULT_BRANCH.to_string()),
            homepage: value.homepage.unwrap_or_default(),
            license: value.license,
            created_at: value.created_at.unwrap_or_default(),
            updated_at: value.updated_at.unwrap_or_default(),
        }
    }
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// A published (or draft) release of a repository.
///
/// Deserializes both the raw GitHub payload and the normalised form this
/// type serializes to, so cached copies read back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRelease")]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    /// Release title; the tag when the release is unnamed
    pub name: String,
    /// Markdown release notes, empty when none
    pub body: String,
    /// Publish timestamp; the creation timestamp for drafts
    pub published_at: String,
    pub draft: bool,
    pub prerelease: bool,
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    id: u64,
    tag_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    draft: Option<bool>,
    #[serde(default)]
    prerelease: Option<bool>,
    #[serde(default)]
    assets: Option<Vec<ReleaseAsset>>,
}

impl From<RawRelease> for Release {
    fn from(value: RawRelease) -> Self {
        let name = value
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| value.tag_name.clone());
        Self {
            id: value.id,
            name,
            tag_name: value.tag_name,
            body: value.body.unwrap_or_default(),
            published_at: value
                .published_at
                .or(value.created_at)
                .unwrap_or_default(),
            draft: value.draft.unwrap_or(false),
            prerelease: value.prerelease.unwrap_or(false),
            assets: value.assets.unwrap_or_default(),
        }
    }
}

/// Core API quota of the current credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Unix timestamp at which the quota resets
    pub reset: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResponse {
    #[serde(default)]
    pub rate: Option<RateLimit>,
    #[serde(default)]
    pub resources: Option<RateLimitResources>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResources {
    pub core: RateLimit,
}

impl RateLimitResponse {
    pub(crate) fn core(self) -> Option<RateLimit> {
        self.rate.or(self.resources.map(|r| r.core))
    }
}

/// A README candidate found at the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadmeFile {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitEnvelope {
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDetail {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryBranchInfo {
    #[serde(default)]
    pub default_branch: Option<String>,
}
