//! Platform publishing: fan-out of the finished video to social platforms.
//!
//! One adapter per submission protocol:
//! - [`YouTubePublisher`]: direct binary upload (resumable session)
//! - [`FacebookPublisher`]: chunked upload session (start/transfer/finish)
//! - [`InstagramPublisher`]: URL-based remote fetch (container + publish)
//! - [`ThreadsPublisher`]: URL-based remote fetch (container + publish)
//!
//! Adapters are invoked independently by the pipeline; one platform's
//! failure never suppresses the others.

mod error;
mod facebook;
mod instagram;
mod threads;
mod traits;
mod types;
mod youtube;

pub use error::PublishError;
pub use facebook::FacebookPublisher;
pub use instagram::InstagramPublisher;
pub use threads::ThreadsPublisher;
pub use traits::PlatformPublisher;
pub use types::{PublishResult, VideoPost};
pub use youtube::YouTubePublisher;
