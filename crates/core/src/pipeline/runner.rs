//! Pipeline runner implementation.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

use crate::archive::ArchiveStore;
use crate::assets::{AssetStore, BACKGROUND_FILE_NAME, FONT_FILE_NAME, TEMPLATE_FILE_NAME};
use crate::composer::{Composer, RenderJob, VideoJob, VIDEO_FILE_NAME};
use crate::config::{Config, ContentConfig, RunConfig};
use crate::generator::QuoteGenerator;
use crate::publisher::{PlatformPublisher, PublishResult, VideoPost};

use super::retry::{retry, RetryPolicy};
use super::types::{RunError, RunReport, TrackSelector};

/// The pipeline runner: sequences one run end to end.
pub struct PipelineRunner {
    content: ContentConfig,
    run_config: RunConfig,
    /// Remote URL of the archived video, derived from configuration.
    /// URL-based publishers receive it through the post; the runtime
    /// archive result stays an independent report output.
    remote_video_url: Option<String>,
    assets: Arc<dyn AssetStore>,
    generator: QuoteGenerator,
    composer: Arc<dyn Composer>,
    archive: Arc<dyn ArchiveStore>,
    publishers: Vec<Arc<dyn PlatformPublisher>>,
    retry_policy: RetryPolicy,
}

impl PipelineRunner {
    /// Create a runner from a validated configuration and its collaborators.
    pub fn new(
        config: &Config,
        assets: Arc<dyn AssetStore>,
        generator: QuoteGenerator,
        composer: Arc<dyn Composer>,
        archive: Arc<dyn ArchiveStore>,
        publishers: Vec<Arc<dyn PlatformPublisher>>,
    ) -> Self {
        let remote_video_url = config.storage.public_url.as_ref().map(|base| {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                config.run.archive_object
            )
        });

        Self {
            content: config.content.clone(),
            run_config: config.run.clone(),
            remote_video_url,
            assets,
            generator,
            composer,
            archive,
            publishers,
            retry_policy: RetryPolicy::new(
                config.run.retry_max_attempts,
                config.run.retry_base_delay_ms,
            ),
        }
    }

    /// Execute one run.
    ///
    /// Control is strictly sequential through the archive stage: each
    /// stage's files must be durably on disk before the next starts. The
    /// publish fan-out at the end never aborts the run.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let started = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();

        // The selector is drawn exactly once; fetch, composition and the
        // report all see the same track.
        let track = TrackSelector::draw(self.run_config.track_min, self.run_config.track_max);
        let work_dir = self.run_config.work_dir.clone();

        info!(run_id = %run_id, track = track.number(), "Pipeline run started");

        // Stage 1: fetch assets.
        let asset_names = vec![
            track.file_name(),
            BACKGROUND_FILE_NAME.to_string(),
            FONT_FILE_NAME.to_string(),
            TEMPLATE_FILE_NAME.to_string(),
        ];
        retry(
            &self.retry_policy,
            "asset fetch",
            |e: &crate::assets::AssetFetchError| e.is_retryable(),
            || self.assets.fetch(&asset_names, &work_dir),
        )
        .await?;
        info!(store = self.assets.name(), "Assets ready");

        // Stage 2: generate the quote artifact.
        let (artifact, artifact_path) = retry(
            &self.retry_policy,
            "quote generation",
            |e: &crate::generator::GenerationError| e.is_retryable(),
            || self.generator.generate(&self.content, &work_dir),
        )
        .await?;
        info!(artifact = %artifact_path.display(), "Quote artifact persisted");

        // Stage 3: render the quote, then compose the video.
        let rendered = self
            .composer
            .render_text(RenderJob {
                background_path: work_dir.join(BACKGROUND_FILE_NAME),
                font_path: work_dir.join(FONT_FILE_NAME),
                text: artifact.quote.clone(),
                output_path: work_dir.join(TEMPLATE_FILE_NAME),
            })
            .await?;
        info!(image = %rendered.path.display(), "Quote rendered");

        let video = self
            .composer
            .compose_video(VideoJob {
                image_path: rendered.path,
                audio_path: work_dir.join(track.file_name()),
                output_path: work_dir.join(VIDEO_FILE_NAME),
                duration_secs: self.run_config.video_duration_secs,
            })
            .await?;
        info!(
            video = %video.path.display(),
            duration_secs = video.duration_secs,
            "Video composed"
        );

        // Stage 4: archive the only durable copy.
        let archive = retry(
            &self.retry_policy,
            "archive upload",
            |e: &crate::archive::ArchiveError| e.is_retryable(),
            || {
                self.archive
                    .upload(&video.path, &self.run_config.archive_object)
            },
        )
        .await?;

        // Stage 5: per-platform fan-out.
        let post = VideoPost {
            video_path: video.path.clone(),
            video_url: self.remote_video_url.clone(),
            title: artifact.title.clone(),
            description: artifact.description.clone(),
            tags: artifact.tags.clone(),
        };
        let publishes = self.publish_all(&post).await;

        let report = RunReport {
            run_id,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            track: track.number(),
            artifact,
            video,
            archive,
            publishes,
        };

        info!(
            run_id = %report.run_id,
            duration_ms = report.duration_ms,
            published = report.published_count(),
            failed = report.failed_count(),
            "Pipeline run finished"
        );
        Ok(report)
    }

    /// Fan the post out to every enabled platform.
    ///
    /// Adapters run concurrently; each reads the finalized video through
    /// its own session and a failure surfaces only in that platform's
    /// result.
    async fn publish_all(&self, post: &VideoPost) -> Vec<PublishResult> {
        let attempts = self.publishers.iter().map(|publisher| {
            let publisher = Arc::clone(publisher);
            let post = post.clone();
            let policy = self.retry_policy;

            async move {
                let platform = publisher.platform().to_string();
                let operation = format!("publish to {platform}");
                let outcome = retry(
                    &policy,
                    &operation,
                    |e: &crate::publisher::PublishError| e.is_retryable(),
                    || publisher.publish(&post),
                )
                .await;

                match outcome {
                    Ok(post_id) => {
                        info!(platform = %platform, post_id = %post_id, "Published");
                        PublishResult::posted(platform, post_id)
                    }
                    Err(e) => {
                        warn!(platform = %platform, error = %e, "Platform publish failed");
                        PublishResult::failed(platform, &e)
                    }
                }
            }
        });

        join_all(attempts).await
    }
}
