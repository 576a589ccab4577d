//! Trait definition for platform publishers.

use async_trait::async_trait;

use super::error::PublishError;
use super::types::VideoPost;

/// A platform adapter implementing one publishing protocol.
#[async_trait]
pub trait PlatformPublisher: Send + Sync {
    /// Platform name used in publish results and logs.
    fn platform(&self) -> &str;

    /// Submits the post and returns the platform-assigned post id.
    async fn publish(&self, post: &VideoPost) -> Result<String, PublishError>;
}
