use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while archiving the composed video.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The store operator could not be constructed from configuration.
    #[error("Archive store initialization failed: {0}")]
    Init(String),

    /// The local video file to upload does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The upload itself failed.
    #[error("Upload failed: {message}")]
    UploadFailed { message: String, retryable: bool },

    /// I/O error reading the local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<opendal::Error> for ArchiveError {
    fn from(e: opendal::Error) -> Self {
        Self::UploadFailed {
            retryable: e.is_temporary(),
            message: e.to_string(),
        }
    }
}

impl ArchiveError {
    /// Whether this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UploadFailed { retryable: true, .. })
    }
}
