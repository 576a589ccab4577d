pub mod archive;
pub mod assets;
pub mod composer;
pub mod config;
pub mod generator;
pub mod pipeline;
pub mod publisher;
pub mod testing;

pub use archive::{ArchiveError, ArchiveReference, ArchiveStore, S3Archive};
pub use assets::{AssetFetchError, AssetStore, DriveClient, FetchedAsset};
pub use composer::{
    ComposedVideo, Composer, ComposerConfig, CompositionError, FfmpegComposer, RenderJob,
    VideoJob,
};
pub use config::{load_config, validate_config, Config, ConfigError};
pub use generator::{
    GeminiClient, GenerationError, LlmClient, LlmError, QuoteArtifact, QuoteGenerator,
};
pub use pipeline::{retry, PipelineRunner, RetryPolicy, RunError, RunReport, TrackSelector};
pub use publisher::{
    FacebookPublisher, InstagramPublisher, PlatformPublisher, PublishError, PublishResult,
    ThreadsPublisher, VideoPost, YouTubePublisher,
};
