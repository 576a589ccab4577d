//! FFmpeg-based composer implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::ComposerConfig;
use super::error::CompositionError;
use super::traits::Composer;
use super::types::{ComposedVideo, MediaInfo, RenderJob, RenderedImage, VideoJob};

/// Outcome of a single ffmpeg invocation, before being mapped into a
/// render- or encode-specific error.
enum FfmpegFailure {
    NotFound,
    Timeout,
    Io(std::io::Error),
    Exited { code: Option<i32>, stderr: String },
}

/// FFmpeg-based composer implementation.
pub struct FfmpegComposer {
    config: ComposerConfig,
}

impl FfmpegComposer {
    /// Creates a new FFmpeg composer with the given configuration.
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    /// Creates a composer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ComposerConfig::default())
    }

    /// Builds ffmpeg arguments for rendering quote text onto the background.
    fn build_render_args(&self, job: &RenderJob) -> Vec<String> {
        let wrapped = wrap_text(&job.text, self.config.wrap_width);
        let filter = format!(
            "drawtext=fontfile={}:text='{}':fontcolor={}:fontsize={}:line_spacing=16:\
             x=(w-text_w)/2:y=(h-text_h)/2",
            job.font_path.to_string_lossy(),
            escape_drawtext(&wrapped),
            self.config.font_color,
            self.config.font_size,
        );

        let mut args = vec![
            "-y".to_string(), // Overwrite the fetched template
            "-i".to_string(),
            job.background_path.to_string_lossy().to_string(),
            "-vf".to_string(),
            filter,
            "-frames:v".to_string(),
            "1".to_string(),
            "-update".to_string(),
            "1".to_string(),
        ];

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(job.output_path.to_string_lossy().to_string());

        args
    }

    /// Builds ffmpeg arguments for composing the still image and audio
    /// track into a video of exactly the requested duration.
    ///
    /// The image input loops indefinitely and the audio input is looped via
    /// `-stream_loop -1`; the output `-t` pins the duration so the result
    /// never tracks the raw track length.
    fn build_video_args(&self, job: &VideoJob) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            job.image_path.to_string_lossy().to_string(),
            "-stream_loop".to_string(),
            "-1".to_string(),
            "-i".to_string(),
            job.audio_path.to_string_lossy().to_string(),
            "-t".to_string(),
            job.duration_secs.to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-tune".to_string(),
            "stillimage".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-r".to_string(),
            "30".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.config.audio_bitrate_kbps),
        ];

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-progress".to_string(),
            "pipe:2".to_string(),
        ]);
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(job.output_path.to_string_lossy().to_string());

        args
    }

    /// Runs ffmpeg with the given arguments, streaming stderr for progress
    /// and error capture.
    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), FfmpegFailure> {
        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FfmpegFailure::NotFound
                } else {
                    FfmpegFailure::Io(e)
                }
            })?;

        let stderr = child.stderr.take().expect("stderr should be captured");
        let mut reader = BufReader::new(stderr).lines();

        let time_regex = Regex::new(r"out_time_ms=(\d+)").ok();
        let speed_regex = Regex::new(r"speed=(\d+\.?\d*)x").ok();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut error_output = String::new();
            let mut last_logged = Instant::now();

            while let Ok(Some(line)) = reader.next_line().await {
                if line.contains("Error") || line.contains("error") {
                    error_output.push_str(&line);
                    error_output.push('\n');
                }

                // Narrate encode progress at a coarse interval
                if last_logged.elapsed() >= Duration::from_secs(5) {
                    let out_time_secs = time_regex
                        .as_ref()
                        .and_then(|re| re.captures(&line))
                        .and_then(|caps| caps.get(1))
                        .and_then(|m| m.as_str().parse::<f64>().ok())
                        .map(|ms| ms / 1_000_000.0);
                    let speed = speed_regex
                        .as_ref()
                        .and_then(|re| re.captures(&line))
                        .and_then(|caps| caps.get(1))
                        .map(|m| format!("{}x", m.as_str()));

                    if let Some(secs) = out_time_secs {
                        debug!(out_time_secs = secs, speed = ?speed, "ffmpeg progress");
                        last_logged = Instant::now();
                    }
                }
            }

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, error_output))
        })
        .await;

        match result {
            Ok(Ok((status, error_output))) => {
                if status.success() {
                    Ok(())
                } else {
                    Err(FfmpegFailure::Exited {
                        code: status.code(),
                        stderr: error_output,
                    })
                }
            }
            Ok(Err(e)) => Err(FfmpegFailure::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                Err(FfmpegFailure::Timeout)
            }
        }
    }

    /// Maps an ffmpeg failure into a render error.
    fn render_error(&self, failure: FfmpegFailure) -> CompositionError {
        match failure {
            FfmpegFailure::NotFound => CompositionError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            },
            FfmpegFailure::Timeout => CompositionError::Timeout {
                timeout_secs: self.config.timeout_secs,
            },
            FfmpegFailure::Io(e) => CompositionError::Io(e),
            FfmpegFailure::Exited { code, stderr } => CompositionError::render_failed(
                format!("FFmpeg exited with code: {code:?}"),
                (!stderr.is_empty()).then_some(stderr),
            ),
        }
    }

    /// Maps an ffmpeg failure into an encode error.
    fn encode_error(&self, failure: FfmpegFailure) -> CompositionError {
        match failure {
            FfmpegFailure::NotFound => CompositionError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            },
            FfmpegFailure::Timeout => CompositionError::Timeout {
                timeout_secs: self.config.timeout_secs,
            },
            FfmpegFailure::Io(e) => CompositionError::Io(e),
            FfmpegFailure::Exited { code, stderr } => CompositionError::encode_failed(
                format!("FFmpeg exited with code: {code:?}"),
                (!stderr.is_empty()).then_some(stderr),
            ),
        }
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, CompositionError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: String,
            duration: Option<String>,
            size: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            codec_name: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| CompositionError::ParseError {
                reason: format!("Failed to parse ffprobe output: {e}"),
            })?;

        let duration_secs = probe
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let size_bytes = probe
            .format
            .size
            .as_ref()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");
        let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");

        let format_name = probe
            .format
            .format_name
            .split(',')
            .next()
            .unwrap_or("unknown");

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes,
            duration_secs,
            format: format_name.to_string(),
            audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
            video_codec: video_stream.and_then(|s| s.codec_name.clone()),
            video_width: video_stream.and_then(|s| s.width),
            video_height: video_stream.and_then(|s| s.height),
        })
    }

    fn require_input(path: &Path) -> Result<(), CompositionError> {
        if !path.exists() {
            return Err(CompositionError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Composer for FfmpegComposer {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, CompositionError> {
        Self::require_input(path)?;

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CompositionError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    CompositionError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(CompositionError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }

    async fn render_text(&self, job: RenderJob) -> Result<RenderedImage, CompositionError> {
        Self::require_input(&job.background_path)?;
        Self::require_input(&job.font_path)?;

        let args = self.build_render_args(&job);
        debug!(output = %job.output_path.display(), "Rendering quote text");

        self.run_ffmpeg(&args)
            .await
            .map_err(|f| self.render_error(f))?;

        let meta = tokio::fs::metadata(&job.output_path)
            .await
            .map_err(|_| CompositionError::render_failed("Output image not created", None))?;

        Ok(RenderedImage {
            path: job.output_path,
            size_bytes: meta.len(),
        })
    }

    async fn compose_video(&self, job: VideoJob) -> Result<ComposedVideo, CompositionError> {
        Self::require_input(&job.image_path)?;
        Self::require_input(&job.audio_path)?;

        let args = self.build_video_args(&job);
        debug!(
            output = %job.output_path.display(),
            duration_secs = job.duration_secs,
            "Composing video"
        );

        self.run_ffmpeg(&args)
            .await
            .map_err(|f| self.encode_error(f))?;

        let info = self.probe(&job.output_path).await?;
        let deviation = (info.duration_secs - job.duration_secs as f64).abs();
        if deviation > self.config.duration_tolerance_secs {
            return Err(CompositionError::DurationMismatch {
                expected_secs: job.duration_secs,
                actual_secs: info.duration_secs,
            });
        }

        Ok(ComposedVideo {
            path: job.output_path,
            duration_secs: info.duration_secs,
            size_bytes: info.size_bytes,
        })
    }

    async fn validate(&self) -> Result<(), CompositionError> {
        // Check ffmpeg exists
        let ffmpeg_result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffmpeg_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(CompositionError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(CompositionError::Io(e));
        }

        // Check ffprobe exists
        let ffprobe_result = Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffprobe_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(CompositionError::FfprobeNotFound {
                    path: self.config.ffprobe_path.clone(),
                });
            }
            return Err(CompositionError::Io(e));
        }

        Ok(())
    }
}

/// Greedy word wrap to at most `width` characters per line.
fn wrap_text(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Escape characters with special meaning inside a drawtext filter value.
fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '\'' | ':' | '%' | ',' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
