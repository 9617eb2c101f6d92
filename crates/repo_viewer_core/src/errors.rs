use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors raised by the viewer engine.
///
/// Per-item failures inside a batch (one directory listing, one file) are not
/// errors at this level: they are logged and reported as omissions. These
/// variants abort the operation that returned them.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote call failed.
    #[error("GitHub request failed: {0}")]
    Gateway(#[from] github_client::Error),

    /// The path is not part of the known tree.
    #[error("Path `{0}` is not in the repository tree")]
    UnknownPath(String),

    /// A selective download was requested with an empty selection.
    #[error("No files or directories selected")]
    NothingSelected,

    /// The selection resolved to zero files.
    #[error("The selection contains no downloadable files")]
    NoFiles,

    /// Every file fetch of a batch failed, so there is nothing to package.
    #[error("All {attempted} file downloads failed")]
    NothingFetched { attempted: usize },

    /// The archive could not be assembled. Nothing was saved.
    #[error("Failed to package archive: {0}")]
    Packaging(String),

    /// The finished archive could not be handed to the save sink.
    #[error("Failed to save `{filename}`: {reason}")]
    Save { filename: String, reason: String },

    /// Persistent storage could not be written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cached data exists but does not decode.
    #[error("Failed to decode cached data: {0}")]
    Decode(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(value: zip::result::ZipError) -> Self {
        Error::Packaging(value.to_string())
    }
}
