use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::GenerationError;

/// Well-known file name the quote artifact is persisted under.
///
/// Part of the inter-stage protocol: the next run overwrites it.
pub const ARTIFACT_FILE_NAME: &str = "quote_data.json";

/// The structured quote record handed from generation to every downstream
/// stage. Composition reads the body; publishing reads title, description
/// and tags. Read-only after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteArtifact {
    pub title: String,
    /// The quote body rendered onto the background image.
    pub quote: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QuoteArtifact {
    /// Persist the artifact under [`ARTIFACT_FILE_NAME`] in `dir`,
    /// superseding any copy from a previous run.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, GenerationError> {
        let path = dir.join(ARTIFACT_FILE_NAME);
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| GenerationError::MalformedArtifact(e.to_string()))?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }

    /// Load a previously persisted artifact from `dir`.
    pub async fn load_from(dir: &Path) -> Result<Self, GenerationError> {
        let path = dir.join(ARTIFACT_FILE_NAME);
        let bytes = tokio::fs::read(&path).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| GenerationError::MalformedArtifact(e.to_string()))
    }
}
