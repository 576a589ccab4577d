//! Run lifecycle integration tests.
//!
//! These tests verify the pipeline runner with mock collaborators:
//! - Stage ordering and the file/artifact hand-off between stages
//! - Abort-before-downstream behavior on stage failures
//! - Per-platform fan-out independence
//! - Bounded retry of transient external failures

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use quotepipe_core::{
    archive::ArchiveError,
    assets::AssetFetchError,
    config::{Config, ContentConfig, DriveConfig, GeneratorConfig, RunConfig, StorageConfig},
    generator::{QuoteGenerator, ARTIFACT_FILE_NAME},
    pipeline::PipelineRunner,
    publisher::{PlatformPublisher, PublishError},
    testing::{MockArchive, MockAssetStore, MockComposer, MockLlm, MockPublisher},
};

/// Test helper wiring the runner to mock collaborators.
struct TestHarness {
    runner: PipelineRunner,
    assets: MockAssetStore,
    llm: MockLlm,
    composer: MockComposer,
    archive: MockArchive,
    publishers: Vec<MockPublisher>,
    work_dir: TempDir,
}

impl TestHarness {
    fn new(platforms: &[&str]) -> Self {
        let work_dir = TempDir::new().expect("Failed to create work dir");
        let config = test_config(work_dir.path());

        let assets = MockAssetStore::new();
        let llm = MockLlm::new();
        let composer = MockComposer::new();
        let archive = MockArchive::new();
        let publishers: Vec<MockPublisher> = platforms
            .iter()
            .map(|name| MockPublisher::new(*name))
            .collect();

        let runner = PipelineRunner::new(
            &config,
            Arc::new(assets.clone()),
            QuoteGenerator::new(Arc::new(llm.clone())),
            Arc::new(composer.clone()),
            Arc::new(archive.clone()),
            publishers
                .iter()
                .map(|p| Arc::new(p.clone()) as Arc<dyn PlatformPublisher>)
                .collect(),
        );

        Self {
            runner,
            assets,
            llm,
            composer,
            archive,
            publishers,
            work_dir,
        }
    }
}

fn test_config(work_dir: &Path) -> Config {
    Config {
        generator: GeneratorConfig {
            api_key: "test-key".to_string(),
            model: "mock-model".to_string(),
            api_base: "http://localhost".to_string(),
            timeout_secs: 5,
        },
        content: ContentConfig {
            adjectives: vec!["calm".to_string(), "bold".to_string()],
            themes: vec!["perseverance".to_string()],
            language: "en".to_string(),
        },
        drive: DriveConfig {
            service_account_json: "{}".to_string(),
            folder_link: "test-folder".to_string(),
            timeout_secs: 5,
        },
        storage: StorageConfig {
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            region: "eu-west-1".to_string(),
            bucket: "quotes".to_string(),
            endpoint: None,
            public_url: Some("https://cdn.test".to_string()),
        },
        youtube: None,
        facebook: None,
        instagram: None,
        threads: None,
        run: RunConfig {
            work_dir: work_dir.to_path_buf(),
            retry_base_delay_ms: 1,
            ..RunConfig::default()
        },
    }
}

// =============================================================================
// Successful Run Tests
// =============================================================================

#[tokio::test]
async fn test_run_produces_video_archive_and_publish_results() {
    let harness = TestHarness::new(&["youtube", "facebook", "instagram"]);

    let report = harness.runner.run().await.expect("run should succeed");

    assert!((101..=113).contains(&report.track));
    assert!(report.video.path.exists(), "composed video should exist");
    assert_eq!(report.archive.url, "https://archive.test/output_video_tn.mp4");
    assert_eq!(report.publishes.len(), 3);
    assert_eq!(report.published_count(), 3);
    assert_eq!(report.failed_count(), 0);

    // The artifact file is on disk for diagnostics and the next run.
    assert!(harness.work_dir.path().join(ARTIFACT_FILE_NAME).exists());

    // Exactly one fetch, one generation, one render, one composition.
    assert_eq!(harness.assets.fetch_count().await, 1);
    assert_eq!(harness.llm.request_count().await, 1);
    assert_eq!(harness.composer.render_count().await, 1);
    assert_eq!(harness.composer.compose_count().await, 1);
    assert_eq!(harness.archive.upload_count().await, 1);
}

#[tokio::test]
async fn test_run_with_no_platforms_is_archive_only() {
    let harness = TestHarness::new(&[]);

    let report = harness.runner.run().await.expect("run should succeed");

    assert!(report.publishes.is_empty());
    assert_eq!(harness.archive.upload_count().await, 1);
}

#[tokio::test]
async fn test_selector_does_not_drift_between_stages() {
    let harness = TestHarness::new(&["facebook"]);

    let report = harness.runner.run().await.expect("run should succeed");
    let track_file = format!("{}.mp3", report.track);

    // The fetched set names the same track the composer consumed.
    let fetches = harness.assets.recorded_fetches().await;
    assert_eq!(fetches.len(), 1);
    assert!(fetches[0].contains(&track_file));

    let video_jobs = harness.composer.recorded_video_jobs().await;
    assert_eq!(video_jobs.len(), 1);
    assert_eq!(
        video_jobs[0].audio_path.file_name().unwrap().to_str().unwrap(),
        track_file
    );
}

#[tokio::test]
async fn test_rendered_text_is_the_artifact_quote() {
    let harness = TestHarness::new(&[]);
    harness
        .llm
        .push_response(
            r#"{"title": "T", "quote": "Exactly this line.", "description": "", "tags": []}"#,
        )
        .await;

    harness.runner.run().await.expect("run should succeed");

    let render_jobs = harness.composer.recorded_render_jobs().await;
    assert_eq!(render_jobs.len(), 1);
    assert_eq!(render_jobs[0].text, "Exactly this line.");
}

#[tokio::test]
async fn test_post_carries_configured_remote_url_and_metadata() {
    let harness = TestHarness::new(&["instagram"]);

    let report = harness.runner.run().await.expect("run should succeed");

    let posts = harness.publishers[0].recorded_posts().await;
    assert_eq!(posts.len(), 1);
    // The remote URL comes from configuration, not the archive result.
    assert_eq!(
        posts[0].video_url.as_deref(),
        Some("https://cdn.test/output_video_tn.mp4")
    );
    assert_eq!(posts[0].title, report.artifact.title);
    assert_eq!(posts[0].tags, report.artifact.tags);
}

// =============================================================================
// Stage Failure Tests
// =============================================================================

#[tokio::test]
async fn test_malformed_artifact_aborts_before_composition() {
    let harness = TestHarness::new(&["youtube", "facebook"]);
    // Missing the `quote` field entirely.
    harness
        .llm
        .push_response(r#"{"title": "T", "tags": []}"#)
        .await;

    let err = harness.runner.run().await.expect_err("run should abort");
    assert_eq!(err.stage(), "generation");

    // Nothing downstream ran.
    assert_eq!(harness.composer.render_count().await, 0);
    assert_eq!(harness.composer.compose_count().await, 0);
    assert_eq!(harness.archive.upload_count().await, 0);
    for publisher in &harness.publishers {
        assert_eq!(publisher.publish_count().await, 0);
    }
}

#[tokio::test]
async fn test_missing_remote_asset_aborts_run() {
    let harness = TestHarness::new(&["facebook"]);
    harness
        .assets
        .set_next_error(AssetFetchError::NotFound {
            name: "bg.png".to_string(),
        })
        .await;

    let err = harness.runner.run().await.expect_err("run should abort");
    assert_eq!(err.stage(), "assets");

    // Non-retryable: exactly one attempt, nothing downstream.
    assert_eq!(harness.assets.fetch_count().await, 1);
    assert_eq!(harness.llm.request_count().await, 0);
    assert_eq!(harness.composer.render_count().await, 0);
}

#[tokio::test]
async fn test_archive_failure_aborts_before_publish() {
    let harness = TestHarness::new(&["facebook"]);
    harness
        .archive
        .set_next_error(ArchiveError::UploadFailed {
            message: "access denied".to_string(),
            retryable: false,
        })
        .await;

    let err = harness.runner.run().await.expect_err("run should abort");
    assert_eq!(err.stage(), "archive");
    assert_eq!(harness.publishers[0].publish_count().await, 0);

    // The composed video is left on disk for inspection.
    assert!(harness.work_dir.path().join("output_video.mp4").exists());
}

// =============================================================================
// Fan-out Independence Tests
// =============================================================================

#[tokio::test]
async fn test_platform_failure_does_not_suppress_siblings() {
    let harness = TestHarness::new(&["youtube", "facebook", "instagram"]);
    harness.publishers[1]
        .set_next_error(PublishError::Api {
            status: 400,
            message: "invalid token".to_string(),
        })
        .await;

    let report = harness.runner.run().await.expect("run should succeed");

    assert_eq!(report.publishes.len(), 3);
    assert_eq!(report.published_count(), 2);
    assert_eq!(report.failed_count(), 1);

    let failed = report
        .publishes
        .iter()
        .find(|p| !p.is_success())
        .expect("one failed result");
    assert_eq!(failed.platform, "facebook");
    assert!(failed.error.as_ref().unwrap().contains("invalid token"));

    // Every adapter was attempted regardless of the failure.
    for publisher in &harness.publishers {
        assert!(publisher.publish_count().await >= 1);
    }
}

#[tokio::test]
async fn test_all_platforms_failing_still_completes_run() {
    let harness = TestHarness::new(&["youtube", "threads"]);
    for publisher in &harness.publishers {
        publisher
            .set_next_error(PublishError::MissingRemoteUrl)
            .await;
    }

    let report = harness.runner.run().await.expect("run should succeed");
    assert_eq!(report.publishes.len(), 2);
    assert_eq!(report.published_count(), 0);
}

// =============================================================================
// Retry Tests
// =============================================================================

#[tokio::test]
async fn test_transient_fetch_error_is_retried() {
    let harness = TestHarness::new(&[]);
    harness.assets.set_next_error(AssetFetchError::Timeout).await;

    let report = harness.runner.run().await.expect("run should succeed");

    assert_eq!(harness.assets.fetch_count().await, 2);
    assert!((101..=113).contains(&report.track));
}

#[tokio::test]
async fn test_transient_publish_error_is_retried() {
    let harness = TestHarness::new(&["youtube"]);
    harness.publishers[0]
        .set_next_error(PublishError::Timeout)
        .await;

    let report = harness.runner.run().await.expect("run should succeed");

    assert_eq!(report.published_count(), 1);
    assert_eq!(harness.publishers[0].publish_count().await, 2);
}

// =============================================================================
// Working Directory Tests
// =============================================================================

#[tokio::test]
async fn test_refetching_same_set_leaves_directory_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = MockAssetStore::new();
    let names = vec![
        "107.mp3".to_string(),
        "bg.png".to_string(),
        "font_tn.ttf".to_string(),
        "output_image.png".to_string(),
    ];

    use quotepipe_core::assets::AssetStore;
    store.fetch(&names, dir.path()).await.unwrap();
    let first: Vec<_> = list_sorted(dir.path());

    store.fetch(&names, dir.path()).await.unwrap();
    let second: Vec<_> = list_sorted(dir.path());

    assert_eq!(first, second);
    assert_eq!(first.len(), names.len());
}

fn list_sorted(dir: &Path) -> Vec<String> {
    let mut entries: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    entries.sort();
    entries
}
