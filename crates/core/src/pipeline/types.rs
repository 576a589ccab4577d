use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::archive::{ArchiveError, ArchiveReference};
use crate::assets::AssetFetchError;
use crate::composer::{ComposedVideo, CompositionError};
use crate::generator::{GenerationError, QuoteArtifact};
use crate::publisher::PublishResult;

/// The audio track selector: a single integer drawn uniformly from the
/// configured inclusive range at the start of a run.
///
/// Immutable for the run's lifetime so the same track is used for fetch,
/// composition and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSelector(u32);

impl TrackSelector {
    /// Draw a selector from the inclusive range `[min, max]`.
    pub fn draw(min: u32, max: u32) -> Self {
        Self(rand::rng().random_range(min..=max))
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    /// Name of the audio asset this selector designates.
    pub fn file_name(&self) -> String {
        format!("{}.mp3", self.0)
    }
}

/// A stage failure that aborts the run.
///
/// Publish failures are deliberately absent: the fan-out isolates them into
/// per-platform results instead.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Asset fetch stage failed: {0}")]
    AssetFetch(#[from] AssetFetchError),

    #[error("Generation stage failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Composition stage failed: {0}")]
    Composition(#[from] CompositionError),

    #[error("Archive stage failed: {0}")]
    Archive(#[from] ArchiveError),
}

impl RunError {
    /// Short stage identifier for diagnostics and exit messages.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::AssetFetch(_) => "assets",
            Self::Generation(_) => "generation",
            Self::Composition(_) => "composition",
            Self::Archive(_) => "archive",
        }
    }
}

/// Summary of one completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// The audio track number used throughout the run.
    pub track: u32,
    pub artifact: QuoteArtifact,
    pub video: ComposedVideo,
    pub archive: ArchiveReference,
    /// One entry per enabled platform, success or failure.
    pub publishes: Vec<PublishResult>,
}

impl RunReport {
    pub fn published_count(&self) -> usize {
        self.publishes.iter().filter(|p| p.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.publishes.len() - self.published_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_stays_in_range() {
        for _ in 0..200 {
            let selector = TrackSelector::draw(101, 113);
            assert!((101..=113).contains(&selector.number()));
        }
    }

    #[test]
    fn test_selector_single_value_range() {
        let selector = TrackSelector::draw(107, 107);
        assert_eq!(selector.number(), 107);
        assert_eq!(selector.file_name(), "107.mp3");
    }

    #[test]
    fn test_run_error_stage_names() {
        let err = RunError::Generation(GenerationError::MalformedArtifact("x".to_string()));
        assert_eq!(err.stage(), "generation");

        let err = RunError::AssetFetch(AssetFetchError::NotFound {
            name: "bg.png".to_string(),
        });
        assert_eq!(err.stage(), "assets");
    }
}
