//! Mock composer for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::composer::{
    ComposedVideo, Composer, CompositionError, MediaInfo, RenderJob, RenderedImage, VideoJob,
};

/// Mock implementation of the [`Composer`] trait.
///
/// Writes placeholder output files, reports the requested duration back
/// exactly, records jobs, and fails either operation on demand.
#[derive(Clone, Default)]
pub struct MockComposer {
    render_jobs: Arc<RwLock<Vec<RenderJob>>>,
    video_jobs: Arc<RwLock<Vec<VideoJob>>>,
    next_render_error: Arc<RwLock<Option<CompositionError>>>,
    next_compose_error: Arc<RwLock<Option<CompositionError>>>,
}

impl MockComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next render to fail with the given error.
    pub async fn set_next_render_error(&self, error: CompositionError) {
        *self.next_render_error.write().await = Some(error);
    }

    /// Configure the next composition to fail with the given error.
    pub async fn set_next_compose_error(&self, error: CompositionError) {
        *self.next_compose_error.write().await = Some(error);
    }

    /// Get the recorded render jobs.
    pub async fn recorded_render_jobs(&self) -> Vec<RenderJob> {
        self.render_jobs.read().await.clone()
    }

    /// Get the recorded video jobs.
    pub async fn recorded_video_jobs(&self) -> Vec<VideoJob> {
        self.video_jobs.read().await.clone()
    }

    /// Number of render calls performed.
    pub async fn render_count(&self) -> usize {
        self.render_jobs.read().await.len()
    }

    /// Number of composition calls performed.
    pub async fn compose_count(&self) -> usize {
        self.video_jobs.read().await.len()
    }
}

#[async_trait]
impl Composer for MockComposer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, CompositionError> {
        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes: 1024,
            duration_secs: 55.0,
            format: "mov".to_string(),
            audio_codec: Some("aac".to_string()),
            video_codec: Some("h264".to_string()),
            video_width: Some(1080),
            video_height: Some(1920),
        })
    }

    async fn render_text(&self, job: RenderJob) -> Result<RenderedImage, CompositionError> {
        self.render_jobs.write().await.push(job.clone());

        if let Some(err) = self.next_render_error.write().await.take() {
            return Err(err);
        }

        tokio::fs::write(&job.output_path, b"mock rendered image").await?;
        Ok(RenderedImage {
            path: job.output_path,
            size_bytes: 19,
        })
    }

    async fn compose_video(&self, job: VideoJob) -> Result<ComposedVideo, CompositionError> {
        self.video_jobs.write().await.push(job.clone());

        if let Some(err) = self.next_compose_error.write().await.take() {
            return Err(err);
        }

        tokio::fs::write(&job.output_path, b"mock composed video").await?;
        Ok(ComposedVideo {
            path: job.output_path,
            duration_secs: job.duration_secs as f64,
            size_bytes: 19,
        })
    }

    async fn validate(&self) -> Result<(), CompositionError> {
        Ok(())
    }
}
