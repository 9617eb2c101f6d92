//! Crate for reading repositories through the GitHub REST API.
//!
//! This crate provides the remote content gateway used by the repository viewer:
//! directory listings, raw file contents, whole-repository archives, releases and
//! the repository metadata shown on the overview. JSON endpoints go through
//! `octocrab`; binary downloads (raw files, zipballs) go through `reqwest`.
//! Every call is bounded by a timeout taken from [`ClientConfig`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use octocrab::{Octocrab, Result as OctocrabResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

pub mod errors;
pub use errors::Error;

pub mod contents;
pub use contents::{ContentEntry, EntryType};

pub mod models;
pub use models::{LicenseInfo, RateLimit, ReadmeFile, Release, ReleaseAsset, RepositorySummary};

pub mod urls;
pub use urls::{build_source_archive_url, encode_repository_path, ArchiveFormat, RepoRef};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Branch assumed when a repository does not report one.
pub const DEFAULT_BRANCH: &str = "main";

/// README names tried, in order, when the requested one is missing.
pub const README_FALLBACKS: [&str; 3] = ["README.md", "README.markdown", "Readme.md"];

/// Endpoints and time bounds used by [`GitHubClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// REST API root, `https://api.github.com` for github.com
    pub api_base_url: String,

    /// Raw content host serving `/{owner}/{repo}/{branch}/{path}`
    pub raw_base_url: String,

    /// Sent as `User-Agent`; GitHub rejects requests without one
    pub user_agent: String,

    /// Bound for metadata, listing and release calls
    #[serde(with = "duration_secs")]
    pub metadata_timeout: Duration,

    /// Bound for a single raw file download
    #[serde(with = "duration_secs")]
    pub content_timeout: Duration,

    /// Bound for a whole-repository archive download
    #[serde(with = "duration_secs")]
    pub archive_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            raw_base_url: "https://raw.githubusercontent.com".to_string(),
            user_agent: concat!("repo-viewer/", env!("CARGO_PKG_VERSION")).to_string(),
            metadata_timeout: Duration::from_secs(10),
            content_timeout: Duration::from_secs(30),
            archive_timeout: Duration::from_secs(60),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

/// The calls the viewer core makes on the hosting API.
///
/// Implemented by [`GitHubClient`]; tests substitute in-memory gateways.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Lists the entries of one directory. The empty path is the repository root.
    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>, Error>;

    /// Downloads the raw content of a file at a branch.
    async fn get_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<Bytes, Error>;

    /// Downloads the pre-built ZIP archive of a branch.
    async fn get_archive(&self, owner: &str, repo: &str, branch: &str) -> Result<Bytes, Error>;

    /// URL of the archive served by [`ContentGateway::get_archive`], for hosts
    /// that can hand the download to a browser instead.
    fn archive_url(&self, owner: &str, repo: &str, branch: &str) -> String;

    /// Lists the releases of a repository, newest first.
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, Error>;

    /// Returns the repository's default branch.
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String, Error>;
}

/// A client for reading repositories from the GitHub API.
#[derive(Debug)]
pub struct GitHubClient {
    client: Octocrab,
    http: reqwest::Client,
    config: ClientConfig,
    token: Option<SecretString>,
}

#[derive(Debug, Serialize)]
struct PageQuery {
    per_page: u8,
}

#[derive(Debug, Serialize)]
struct CommitQuery<'a> {
    path: &'a str,
    per_page: u8,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` for the endpoints in `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoints and timeouts.
    /// * `token` - Optional personal access token. Without one, requests are
    ///   anonymous and subject to the much lower unauthenticated quota.
    ///
    /// # Errors
    /// Returns an `Error::AuthError` if either HTTP client cannot be built.
    pub fn from_config(config: ClientConfig, token: Option<&str>) -> Result<Self, Error> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.to_string()));

        let client = create_token_client(&config.api_base_url, token.as_ref())?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client for content downloads");
                Error::AuthError(format!("Failed to build HTTP client: {}", e))
            })?;

        info!(
            api_base_url = %config.api_base_url,
            authenticated = token.is_some(),
            "Created GitHub client"
        );

        Ok(Self {
            client,
            http,
            config,
            token,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns `true` when requests carry a token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Fetches the overview details for a specific repository.
    ///
    /// # Errors
    /// `Error::NotFound` when the repository does not exist, `Error::RateLimitExceeded`
    /// when the quota is exhausted, `Error::Timeout` when the call exceeds the
    /// metadata bound.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepositorySummary, Error> {
        let route = format!("/repos/{}/{}", owner, repo);
        self.get_json(&route, None::<&()>, "Failed to get repository")
            .await
    }

    /// Lists the README variants found at the repository root.
    ///
    /// A file counts when its name starts with `README` (any case) and ends
    /// with `.md` or `.markdown`.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn list_readmes(&self, owner: &str, repo: &str) -> Result<Vec<ReadmeFile>, Error> {
        let entries = self.list_directory(owner, repo, "").await?;
        let readmes: Vec<ReadmeFile> = entries
            .into_iter()
            .filter(|e| !e.is_directory())
            .filter(|e| {
                e.name.to_uppercase().starts_with("README")
                    && (e.name.ends_with(".md") || e.name.ends_with(".markdown"))
            })
            .map(|e| ReadmeFile {
                name: e.name,
                path: e.path,
            })
            .collect();

        debug!(count = readmes.len(), "Found README candidates");
        Ok(readmes)
    }

    /// Reads a README as text, trying the common names when `preferred` is missing.
    ///
    /// Returns the path that was found together with its content.
    ///
    /// # Errors
    /// `Error::NotFound` when none of the candidates exist; any other failure is
    /// returned as soon as it happens.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, branch = %branch))]
    pub async fn get_readme(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        preferred: &str,
    ) -> Result<(String, String), Error> {
        let mut candidates = vec![preferred];
        candidates.extend(README_FALLBACKS.iter().filter(|c| **c != preferred));

        for candidate in candidates {
            match self.get_file(owner, repo, branch, candidate).await {
                Ok(bytes) => {
                    info!(path = candidate, "Loaded README");
                    return Ok((
                        candidate.to_string(),
                        String::from_utf8_lossy(&bytes).into_owned(),
                    ));
                }
                Err(Error::NotFound) => {
                    debug!(path = candidate, "README candidate not present");
                }
                Err(e) => return Err(e),
            }
        }

        warn!("No README found in repository");
        Err(Error::NotFound)
    }

    /// Reads the full license text detected by GitHub.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn get_license_text(&self, owner: &str, repo: &str) -> Result<String, Error> {
        let route = format!("/repos/{}/{}/license", owner, repo);
        let payload: contents::EncodedContent = self
            .get_json(&route, None::<&()>, "Failed to get license")
            .await?;

        if payload.encoding.as_deref().unwrap_or("base64") != "base64" {
            error!(encoding = ?payload.encoding, "Unexpected license encoding");
            return Err(Error::InvalidResponse);
        }

        let cleaned: String = payload
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| {
                error!(error = %e, "License content is not valid base64");
                Error::InvalidResponse
            })?;

        Ok(String::from_utf8_lossy(&decoded).into_owned())
    }

    /// Returns the message of the most recent commit touching `path`.
    ///
    /// `Ok(None)` when the path has no history on the default branch.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, path = %path))]
    pub async fn latest_commit_message(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<String>, Error> {
        let route = format!("/repos/{}/{}/commits", owner, repo);
        let query = CommitQuery { path, per_page: 1 };
        let commits: Vec<models::CommitEnvelope> = self
            .get_json(&route, Some(&query), "Failed to list commits")
            .await?;

        Ok(commits.into_iter().next().map(|c| c.commit.message))
    }

    /// Reports the core API quota for the configured credentials.
    #[instrument(skip(self))]
    pub async fn rate_limit(&self) -> Result<RateLimit, Error> {
        let response: models::RateLimitResponse = self
            .get_json("/rate_limit", None::<&()>, "Failed to get rate limit")
            .await?;
        response.core().ok_or(Error::InvalidResponse)
    }

    async fn get_json<R, P>(&self, route: &str, parameters: Option<&P>, message: &str) -> Result<R, Error>
    where
        R: octocrab::FromResponse,
        P: Serialize + ?Sized,
    {
        with_timeout(self.config.metadata_timeout, async {
            let result: OctocrabResult<R> = self.client.get(route, parameters).await;
            result.map_err(|e| map_octocrab_error(message, e))
        })
        .await
    }

    async fn download(&self, url: &str, limit: Duration) -> Result<Bytes, Error> {
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        with_timeout(limit, async {
            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(limit)
                } else {
                    Error::from(e)
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                warn!(url = url, status = status.as_u16(), "Download failed");
                return Err(Error::from_status(status));
            }

            Ok(response.bytes().await?)
        })
        .await
    }
}

#[async_trait]
impl ContentGateway for GitHubClient {
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, path = %path))]
    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>, Error> {
        let encoded = encode_repository_path(path);
        let route = if encoded.is_empty() {
            format!("/repos/{}/{}/contents", owner, repo)
        } else {
            format!("/repos/{}/{}/contents/{}", owner, repo, encoded)
        };

        let entries: Vec<ContentEntry> = self
            .get_json(&route, None::<&()>, "Failed to list directory")
            .await?;

        debug!(count = entries.len(), "Listed directory");
        Ok(entries)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo, branch = %branch, path = %path))]
    async fn get_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<Bytes, Error> {
        let url = urls::join_url(
            &self.config.raw_base_url,
            &format!(
                "{}/{}/{}/{}",
                owner,
                repo,
                urlencoding::encode(branch),
                encode_repository_path(path)
            ),
        );
        self.download(&url, self.config.content_timeout).await
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo, branch = %branch))]
    async fn get_archive(&self, owner: &str, repo: &str, branch: &str) -> Result<Bytes, Error> {
        let url = self.archive_url(owner, repo, branch);
        let bytes = self.download(&url, self.config.archive_timeout).await?;
        info!(size = bytes.len(), "Downloaded repository archive");
        Ok(bytes)
    }

    fn archive_url(&self, owner: &str, repo: &str, branch: &str) -> String {
        urls::join_url(
            &self.config.api_base_url,
            &format!(
                "repos/{}/{}/zipball/{}",
                owner,
                repo,
                urlencoding::encode(branch)
            ),
        )
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, Error> {
        let route = format!("/repos/{}/{}/releases", owner, repo);
        let releases: Vec<Release> = self
            .get_json(&route, Some(&PageQuery { per_page: 100 }), "Failed to list releases")
            .await?;

        info!(count = releases.len(), "Retrieved releases");
        Ok(releases)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String, Error> {
        let route = format!("/repos/{}/{}", owner, repo);
        let info: models::RepositoryBranchInfo = self
            .get_json(&route, None::<&()>, "Failed to get repository")
            .await?;

        Ok(info
            .default_branch
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string()))
    }
}

/// Creates an `Octocrab` client for `base_uri`, authenticated with a personal
/// access token when one is given.
///
/// # Errors
///
/// Returns `Error::AuthError` if the base URI is invalid or the client cannot
/// be built.
#[instrument(skip(token))]
pub fn create_token_client(base_uri: &str, token: Option<&SecretString>) -> Result<Octocrab, Error> {
    let mut builder = Octocrab::builder().base_uri(base_uri).map_err(|e| {
        error!(base_uri = base_uri, error = %e, "Invalid GitHub API base URI");
        Error::AuthError(format!("Invalid API base URI `{}`", base_uri))
    })?;

    if let Some(token) = token {
        builder = builder.personal_token(token.expose_secret().to_string());
    }

    builder.build().map_err(|e| {
        error!(error = ?e, "Failed to build Octocrab client");
        Error::AuthError("Failed to build the GitHub API client.".to_string())
    })
}

/// Runs `operation`, failing with `Error::Timeout` once `limit` has elapsed.
pub async fn with_timeout<T, F>(limit: Duration, operation: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!(limit_secs = limit.as_secs_f64(), "Request timed out");
            Err(Error::Timeout(limit))
        }
    }
}

fn map_octocrab_error(message: &str, e: octocrab::Error) -> Error {
    let mapped = match &e {
        octocrab::Error::GitHub { source, .. } => Error::from_status(source.status_code),
        octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => Error::InvalidResponse,
        other => Error::Transport(other.to_string()),
    };
    log_octocrab_error(message, e);
    mapped
}

fn log_octocrab_error(message: &str, e: octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, backtrace } => {
            let err = source;
            error!(
                error_message = err.message,
                status = err.status_code.as_u16(),
                backtrace = backtrace.to_string(),
                "{}. Received an error from GitHub",
                message
            )
        }
        octocrab::Error::UriParse { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}, Failed to parse URI.",
            message
        ),
        octocrab::Error::InvalidUtf8 { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. The message wasn't valid UTF-8.",
            message,
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
