//! Trait definition for the composer module.

use async_trait::async_trait;
use std::path::Path;

use super::error::CompositionError;
use super::types::{ComposedVideo, MediaInfo, RenderJob, RenderedImage, VideoJob};

/// A composer that renders quote text and encodes the run's video.
#[async_trait]
pub trait Composer: Send + Sync {
    /// Returns the name of this composer implementation.
    fn name(&self) -> &str;

    /// Probes a media file to get its information.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, CompositionError>;

    /// Renders quote text onto the background image.
    async fn render_text(&self, job: RenderJob) -> Result<RenderedImage, CompositionError>;

    /// Composes the rendered image and an audio track into a video of
    /// exactly the requested duration, regardless of the track's length.
    async fn compose_video(&self, job: VideoJob) -> Result<ComposedVideo, CompositionError>;

    /// Validates that the composer is properly configured and ready.
    async fn validate(&self) -> Result<(), CompositionError>;
}
