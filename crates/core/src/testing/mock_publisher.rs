//! Mock platform publisher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::publisher::{PlatformPublisher, PublishError, VideoPost};

/// Mock implementation of the [`PlatformPublisher`] trait.
///
/// Assigns sequential post ids and fails on demand, so fan-out
/// independence can be asserted per platform.
#[derive(Clone)]
pub struct MockPublisher {
    platform: String,
    /// Recorded posts.
    posts: Arc<RwLock<Vec<VideoPost>>>,
    /// If set, the next publish fails with this error.
    next_error: Arc<RwLock<Option<PublishError>>>,
}

impl MockPublisher {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            posts: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the next publish to fail with the given error.
    pub async fn set_next_error(&self, error: PublishError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get the recorded posts.
    pub async fn recorded_posts(&self) -> Vec<VideoPost> {
        self.posts.read().await.clone()
    }

    /// Number of publish calls performed.
    pub async fn publish_count(&self) -> usize {
        self.posts.read().await.len()
    }
}

#[async_trait]
impl PlatformPublisher for MockPublisher {
    fn platform(&self) -> &str {
        &self.platform
    }

    async fn publish(&self, post: &VideoPost) -> Result<String, PublishError> {
        let mut posts = self.posts.write().await;
        posts.push(post.clone());
        let sequence = posts.len();
        drop(posts);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(format!("{}-post-{}", self.platform, sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn post() -> VideoPost {
        VideoPost {
            video_path: PathBuf::from("output_video.mp4"),
            video_url: None,
            title: "T".to_string(),
            description: String::new(),
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_sequential_post_ids() {
        let publisher = MockPublisher::new("facebook");
        assert_eq!(publisher.publish(&post()).await.unwrap(), "facebook-post-1");
        assert_eq!(publisher.publish(&post()).await.unwrap(), "facebook-post-2");
        assert_eq!(publisher.publish_count().await, 2);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let publisher = MockPublisher::new("threads");
        publisher
            .set_next_error(PublishError::MissingRemoteUrl)
            .await;

        assert!(publisher.publish(&post()).await.is_err());
        assert!(publisher.publish(&post()).await.is_ok());
    }
}
