use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the repository viewer CLI.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading or parsing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A GitHub request failed.
    #[error(transparent)]
    GitHub(#[from] github_client::Error),

    /// The viewer engine reported a failure.
    #[error(transparent)]
    Engine(#[from] repo_viewer_core::Error),

    /// The release list could not be loaded and nothing was cached.
    #[error("Failed to load releases: {0}")]
    Releases(String),

    /// Failed to flush the standard output buffer.
    #[error("Failed to flush the std out buffer.")]
    StdOutFlushFailed,
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Usage errors exit with 2, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArguments(_) => 2,
            Error::GitHub(github_client::Error::InvalidRepositoryReference(_)) => 2,
            _ => 1,
        }
    }
}
