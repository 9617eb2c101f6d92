//! Repository references and URL construction.
//!
//! Pure helpers: parsing user input into an `owner/repo` pair and building the
//! web and raw-content URLs the viewer hands out.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;

#[cfg(test)]
#[path = "urls_tests.rs"]
mod tests;

static DIRECT_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").unwrap());

static URL_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com[/:]([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)").unwrap());

/// Identifies one repository on GitHub.
///
/// # Examples
///
/// ```rust
/// use github_client::RepoRef;
///
/// let repo: RepoRef = "https://github.com/rust-lang/cargo/tree/master".parse().unwrap();
/// assert_eq!(repo.owner, "rust-lang");
/// assert_eq!(repo.repo, "cargo");
/// assert_eq!(repo.to_string(), "rust-lang/cargo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses `owner/repo` or any URL containing `github.com/owner/repo`.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let input = input.trim();
        let captures = DIRECT_REFERENCE
            .captures(input)
            .or_else(|| URL_REFERENCE.captures(input))
            .ok_or_else(|| Error::InvalidRepositoryReference(input.to_string()))?;

        let owner = &captures[1];
        let repo = captures[2].trim_end_matches(".git");
        if owner.is_empty() || repo.is_empty() || owner.starts_with('.') {
            return Err(Error::InvalidRepositoryReference(input.to_string()));
        }
        Ok(Self::new(owner, repo))
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Archive formats GitHub serves for tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveFormat {
    #[serde(rename = "zip")]
    Zip,
    #[serde(rename = "tar.gz")]
    TarGz,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar.gz" | "tgz" => Ok(ArchiveFormat::TarGz),
            other => Err(format!("unknown archive format `{}`", other)),
        }
    }
}

/// Builds the source archive link for a tag.
///
/// Uses the `refs/tags/` form, which keeps working when a branch shares the
/// tag's name.
pub fn build_source_archive_url(owner: &str, repo: &str, tag: &str, format: ArchiveFormat) -> String {
    format!(
        "https://github.com/{}/{}/archive/refs/tags/{}.{}",
        owner,
        repo,
        tag,
        format.extension()
    )
}

/// Percent-encodes each segment of a repository path, keeping the separators.
pub fn encode_repository_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins a base URL and a relative route without doubling the slash.
pub(crate) fn join_url(base: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}
