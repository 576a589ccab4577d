use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quotepipe_core::{
    load_config, validate_config, Composer, DriveClient, FacebookPublisher, FfmpegComposer,
    GeminiClient, InstagramPublisher, PipelineRunner, PlatformPublisher, QuoteGenerator,
    RunReport, S3Archive, ThreadsPublisher, YouTubePublisher,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File the run report is written to in the working directory.
const REPORT_FILE_NAME: &str = "run_report.json";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Pick up a local .env before reading the environment
    let _ = dotenvy::dotenv();

    info!(version = VERSION, "quotepipe starting");

    // Load and validate configuration; the environment is the sole channel.
    let config = load_config().context("Failed to load configuration from the environment")?;
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        model = %config.generator.model,
        language = %config.content.language,
        work_dir = %config.run.work_dir.display(),
        duration_secs = config.run.video_duration_secs,
        "Configuration loaded"
    );

    // Asset store
    let assets = DriveClient::new(&config.drive).context("Failed to create drive client")?;

    // Quote generator
    let llm = GeminiClient::new(
        config.generator.api_key.clone(),
        config.generator.model.clone(),
        config.generator.timeout_secs,
    )
    .with_api_base(config.generator.api_base.clone());
    let generator = QuoteGenerator::new(Arc::new(llm));

    // Composer; fail fast if ffmpeg/ffprobe are missing.
    let composer = FfmpegComposer::with_defaults();
    composer
        .validate()
        .await
        .context("FFmpeg validation failed")?;
    info!("Composer ready");

    // Archive store
    let archive =
        S3Archive::new(config.storage.clone()).context("Failed to create archive store")?;
    info!(bucket = %config.storage.bucket, "Archive store ready");

    // Platform publishers; a present config section enables the adapter.
    let mut publishers: Vec<Arc<dyn PlatformPublisher>> = Vec::new();
    if let Some(ref youtube) = config.youtube {
        info!("YouTube publisher enabled");
        publishers.push(Arc::new(YouTubePublisher::new(youtube.clone())));
    }
    if let Some(ref facebook) = config.facebook {
        info!(page_id = %facebook.page_id, "Facebook publisher enabled");
        publishers.push(Arc::new(FacebookPublisher::new(facebook.clone())));
    }
    if let Some(ref instagram) = config.instagram {
        info!(user_id = %instagram.user_id, "Instagram publisher enabled");
        publishers.push(Arc::new(InstagramPublisher::new(instagram.clone())));
    }
    if let Some(ref threads) = config.threads {
        info!(user_id = %threads.user_id, "Threads publisher enabled");
        publishers.push(Arc::new(ThreadsPublisher::new(threads.clone())));
    }
    if publishers.is_empty() {
        info!("No platforms enabled; running archive-only");
    }

    let work_dir = config.run.work_dir.clone();
    let runner = PipelineRunner::new(
        &config,
        Arc::new(assets),
        generator,
        Arc::new(composer),
        Arc::new(archive),
        publishers,
    );

    // One run per invocation; scheduling is external.
    let report = match runner.run().await {
        Ok(report) => report,
        Err(e) => bail!("{} stage failed: {}", e.stage(), e),
    };

    write_report(&report, &work_dir).await;
    summarize(&report);

    Ok(())
}

/// Persist the run report next to the run's artifacts.
async fn write_report(report: &RunReport, work_dir: &std::path::Path) {
    let path = work_dir.join(REPORT_FILE_NAME);
    match serde_json::to_vec_pretty(report) {
        Ok(json) => {
            if let Err(e) = tokio::fs::write(&path, json).await {
                warn!(path = %path.display(), error = %e, "Failed to write run report");
            } else {
                info!(path = %path.display(), "Run report written");
            }
        }
        Err(e) => warn!(error = %e, "Failed to serialize run report"),
    }
}

fn summarize(report: &RunReport) {
    info!(
        run_id = %report.run_id,
        track = report.track,
        archive_url = %report.archive.url,
        "Run complete"
    );
    for publish in &report.publishes {
        match (&publish.post_id, &publish.error) {
            (Some(post_id), _) => {
                info!(platform = %publish.platform, post_id = %post_id, "Published")
            }
            (None, Some(error)) => {
                warn!(platform = %publish.platform, error = %error, "Publish failed")
            }
            (None, None) => warn!(platform = %publish.platform, "Publish failed"),
        }
    }
}
