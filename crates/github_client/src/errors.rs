//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when reading repository
//! data from the GitHub API through the github_client crate. The variants follow
//! the failure classes a repository viewer has to react to differently: timeouts
//! can be retried by the user, rate limiting asks for a token, missing entities
//! are terminal for that request.

use std::time::Duration;

use http::StatusCode;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.list_directory("owner", "repo", "src").await {
///     Ok(entries) => println!("{} entries", entries.len()),
///     Err(Error::RateLimitExceeded) => eprintln!("Rate limit exceeded, supply a token"),
///     Err(Error::Timeout(limit)) => eprintln!("Timed out after {limit:?}, try again"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client initialization failure.
    ///
    /// The contained string describes why the HTTP client could not be built,
    /// for example an unusable base URL or token.
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// Error deserializing the response from GitHub.
    ///
    /// The body arrived but does not have the expected shape.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The remote answered with a non-success status that has no dedicated variant.
    #[error("GitHub returned HTTP status {status}")]
    Http { status: u16 },

    /// The text supplied as a repository identifier is neither `owner/repo`
    /// nor a GitHub URL.
    #[error("Invalid repository reference: {0}")]
    InvalidRepositoryReference(String),

    /// The GitHub API returned a response in an unexpected format.
    #[error("Invalid response format")]
    InvalidResponse,

    /// The requested resource was not found.
    ///
    /// Returned for 404 responses: the repository, path, branch or release does
    /// not exist or is not visible with the current credentials. Not retried.
    #[error("Resource not found")]
    NotFound,

    /// GitHub API rate limit has been exceeded.
    ///
    /// Anonymous callers hit this quickly. Supplying a personal access token
    /// raises the quota.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The request did not complete within its time bound.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be sent or the connection broke while reading.
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl Error {
    /// Maps an HTTP status onto the error taxonomy.
    ///
    /// GitHub signals quota exhaustion with 403 as well as 429, so both are
    /// treated as rate limiting.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => Error::NotFound,
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Error::RateLimitExceeded,
            other => Error::Http {
                status: other.as_u16(),
            },
        }
    }

    /// Returns `true` when repeating the same request later may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::Transport(_) | Error::RateLimitExceeded
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if let Some(status) = value.status() {
            return Error::from_status(status);
        }
        if value.is_decode() {
            return Error::InvalidResponse;
        }
        Error::Transport(value.to_string())
    }
}
