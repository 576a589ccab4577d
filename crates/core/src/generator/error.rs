use thiserror::Error;

use super::llm::LlmError;

/// Errors that can occur while generating the quote artifact.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model call itself failed.
    #[error("Model call failed: {0}")]
    Llm(#[from] LlmError),

    /// The model produced output that does not parse as a quote artifact,
    /// or parses into an unusable one.
    #[error("Malformed quote artifact: {0}")]
    MalformedArtifact(String),

    /// I/O error while persisting or reading the artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerationError {
    /// Whether this error is worth retrying. Only transport-level failures
    /// qualify; malformed output is a content problem, not a transient one.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.is_retryable(),
            Self::MalformedArtifact(_) | Self::Io(_) => false,
        }
    }
}
