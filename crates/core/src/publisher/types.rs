use serde::Serialize;
use std::path::PathBuf;

use super::error::PublishError;

/// The publisher-facing projection of a finished run: the composed video
/// plus the quote metadata that accompanies it.
#[derive(Debug, Clone)]
pub struct VideoPost {
    /// Local path of the composed video (direct-upload platforms).
    pub video_path: PathBuf,
    /// Publicly reachable URL of the same video (URL-based platforms).
    /// Derived from configuration, not from the runtime archive result.
    pub video_url: Option<String>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl VideoPost {
    /// Caption used by platforms that take a single free-text field.
    pub fn caption(&self) -> String {
        let mut caption = self.title.clone();
        if !self.description.is_empty() {
            caption.push_str("\n\n");
            caption.push_str(&self.description);
        }
        let hashtags: Vec<String> = self
            .tags
            .iter()
            .map(|t| format!("#{}", t.replace(char::is_whitespace, "")))
            .collect();
        if !hashtags.is_empty() {
            caption.push_str("\n\n");
            caption.push_str(&hashtags.join(" "));
        }
        caption
    }
}

/// Outcome of one platform's publish attempt.
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    pub platform: String,
    /// Platform-assigned post identifier on success.
    pub post_id: Option<String>,
    /// Error detail on failure.
    pub error: Option<String>,
}

impl PublishResult {
    pub fn posted(platform: impl Into<String>, post_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            post_id: Some(post_id.into()),
            error: None,
        }
    }

    pub fn failed(platform: impl Into<String>, error: &PublishError) -> Self {
        Self {
            platform: platform.into(),
            post_id: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.post_id.is_some()
    }
}
