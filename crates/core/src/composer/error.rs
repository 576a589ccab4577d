//! Error types for the composer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during rendering or video composition.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// A required input file (background, font, image, audio) is missing.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Text rendering onto the background failed.
    #[error("Render failed: {reason}")]
    RenderFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Video encoding failed.
    #[error("Encode failed: {reason}")]
    EncodeFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The composed video's duration deviates from the requested one.
    #[error("Composed video duration {actual_secs:.2}s deviates from requested {expected_secs}s")]
    DurationMismatch {
        expected_secs: u64,
        actual_secs: f64,
    },

    /// FFmpeg invocation timed out.
    #[error("Composition timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to probe a media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Failed to parse FFprobe output.
    #[error("Failed to parse media info: {reason}")]
    ParseError { reason: String },

    /// I/O error during composition.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompositionError {
    /// Creates a new render failed error with stderr output.
    pub fn render_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::RenderFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new encode failed error with stderr output.
    pub fn encode_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}
