use thiserror::Error;

/// Errors that can occur while fetching run assets from the remote drive.
#[derive(Debug, Error)]
pub enum AssetFetchError {
    /// Service-account credentials could not be parsed or used for signing.
    #[error("Invalid drive credentials: {0}")]
    InvalidCredentials(String),

    /// The configured folder link does not contain a folder id.
    #[error("Invalid drive folder link: {0}")]
    InvalidFolderLink(String),

    /// Token exchange with the drive host failed.
    #[error("Drive authentication failed: {0}")]
    Auth(String),

    /// A requested file does not exist in the shared folder.
    #[error("Asset not found on remote drive: {name}")]
    NotFound { name: String },

    /// Downloaded bytes do not match the checksum reported by the drive.
    #[error("Checksum mismatch for downloaded asset: {name}")]
    ChecksumMismatch { name: String },

    /// The drive API rejected a request.
    #[error("Drive API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request timed out.
    #[error("Drive request timed out")]
    Timeout,

    /// I/O error writing an asset to the working directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetFetchError {
    /// Whether this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
