//! Media composition: text rendering and video encoding.
//!
//! Two sequential operations per run: draw the quote body onto the fetched
//! background image, then loop the still image with the selected audio track
//! into a video of exactly the configured duration.

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ComposerConfig;
pub use error::CompositionError;
pub use ffmpeg::FfmpegComposer;
pub use traits::Composer;
pub use types::{ComposedVideo, MediaInfo, RenderJob, RenderedImage, VideoJob, VIDEO_FILE_NAME};
