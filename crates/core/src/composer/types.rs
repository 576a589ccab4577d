use serde::Serialize;
use std::path::PathBuf;

/// Well-known name of the composed video in the working directory.
pub const VIDEO_FILE_NAME: &str = "output_video.mp4";

/// A request to draw quote text onto a background image.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Background image fetched from the asset store.
    pub background_path: PathBuf,
    /// Font file fetched from the asset store.
    pub font_path: PathBuf,
    /// Quote body to render.
    pub text: String,
    /// Output image path; an existing file is overwritten.
    pub output_path: PathBuf,
}

/// Result of a text render.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// A request to compose a still image and an audio track into a video.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_path: PathBuf,
    /// Exact target duration; audio is looped or trimmed to match.
    pub duration_secs: u64,
}

/// Result of a video composition.
#[derive(Debug, Clone, Serialize)]
pub struct ComposedVideo {
    pub path: PathBuf,
    /// Probed duration of the output file.
    pub duration_secs: f64,
    pub size_bytes: u64,
}

/// Probed information about a media file.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_secs: f64,
    pub format: String,
    pub audio_codec: Option<String>,
    pub video_codec: Option<String>,
    pub video_width: Option<u32>,
    pub video_height: Option<u32>,
}
