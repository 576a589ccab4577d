use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing to a single platform.
///
/// Publish errors are isolated per adapter: they surface in that platform's
/// [`super::PublishResult`] and never abort the run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The platform posts by remote URL but no public video URL is
    /// configured for the run.
    #[error("No remote video URL available for a URL-based platform")]
    MissingRemoteUrl,

    /// The local video file does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Token exchange or credential use failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The platform API rejected a request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The platform answered with something the protocol does not allow
    /// (missing session id, missing upload location, unparsable offset).
    #[error("Unexpected API response: {0}")]
    Protocol(String),

    /// The platform did not finish processing the media in time.
    #[error("Media processing did not finish after {attempts} polls")]
    ProcessingTimeout { attempts: u32 },

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// I/O error reading the local video.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Whether this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub(super) fn map_transport_error(e: reqwest::Error) -> PublishError {
    if e.is_timeout() {
        PublishError::Timeout
    } else {
        PublishError::Http(e.to_string())
    }
}
