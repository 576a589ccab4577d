//! Configuration for the composer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Timeout for a single ffmpeg invocation in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Font size for the rendered quote text.
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Font color for the rendered quote text.
    #[serde(default = "default_font_color")]
    pub font_color: String,

    /// Maximum characters per rendered line before wrapping.
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,

    /// Audio bitrate of the composed video in kbps.
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate_kbps: u32,

    /// Tolerated deviation between the requested and the probed video
    /// duration, in seconds.
    #[serde(default = "default_duration_tolerance")]
    pub duration_tolerance_secs: f64,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional ffmpeg arguments appended before the output path.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_timeout() -> u64 {
    300
}

fn default_font_size() -> u32 {
    48
}

fn default_font_color() -> String {
    "white".to_string()
}

fn default_wrap_width() -> usize {
    28
}

fn default_audio_bitrate() -> u32 {
    192
}

fn default_duration_tolerance() -> f64 {
    0.5
}

fn default_log_level() -> String {
    "warning".to_string()
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: default_timeout(),
            font_size: default_font_size(),
            font_color: default_font_color(),
            wrap_width: default_wrap_width(),
            audio_bitrate_kbps: default_audio_bitrate(),
            duration_tolerance_secs: default_duration_tolerance(),
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl ComposerConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the rendered font size.
    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }
}
