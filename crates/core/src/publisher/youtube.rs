//! YouTube publisher: direct binary upload through a resumable session.
//!
//! Protocol: exchange the long-lived refresh token for an access token,
//! open a resumable upload session carrying the video snippet, then PUT
//! the video bytes to the session location.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::YouTubeConfig;

use super::error::{map_transport_error, PublishError};
use super::traits::PlatformPublisher;
use super::types::VideoPost;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";
const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct VideoResource<'a> {
    snippet: Snippet<'a>,
    status: UploadStatus<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Snippet<'a> {
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
    category_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadStatus<'a> {
    privacy_status: &'a str,
    self_declared_made_for_kids: bool,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

/// YouTube implementation of [`PlatformPublisher`].
pub struct YouTubePublisher {
    client: Client,
    config: YouTubeConfig,
    token_url: String,
    upload_url: String,
}

impl YouTubePublisher {
    pub fn new(config: YouTubeConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            config,
            token_url: TOKEN_URL.to_string(),
            upload_url: UPLOAD_URL.to_string(),
        }
    }

    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        upload_url: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.upload_url = upload_url.into();
        self
    }

    /// Exchange the refresh token for a short-lived access token.
    async fn access_token(&self) -> Result<String, PublishError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Auth(format!("HTTP {status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Auth(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Open a resumable upload session; the server answers with the
    /// session location the bytes go to.
    async fn open_session(
        &self,
        token: &str,
        post: &VideoPost,
    ) -> Result<String, PublishError> {
        let resource = VideoResource {
            snippet: Snippet {
                title: &post.title,
                description: &post.description,
                tags: &post.tags,
                category_id: self.config.category_id.to_string(),
            },
            status: UploadStatus {
                privacy_status: &self.config.privacy_status,
                self_declared_made_for_kids: false,
            },
        };

        let response = self
            .client
            .post(&self.upload_url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(token)
            .header("X-Upload-Content-Type", "video/mp4")
            .json(&resource)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status,
                message: body,
            });
        }

        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                PublishError::Protocol("resumable session missing location header".to_string())
            })
    }

    async fn upload_bytes(
        &self,
        token: &str,
        session_url: &str,
        bytes: Vec<u8>,
    ) -> Result<String, PublishError> {
        debug!(size_bytes = bytes.len(), "Uploading video bytes");

        let response = self
            .client
            .put(session_url)
            .bearer_auth(token)
            .header("content-type", "video/mp4")
            .body(bytes)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        if status != 200 && status != 201 {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status,
                message: body,
            });
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Protocol(e.to_string()))?;
        Ok(uploaded.id)
    }
}

#[async_trait]
impl PlatformPublisher for YouTubePublisher {
    fn platform(&self) -> &str {
        "youtube"
    }

    async fn publish(&self, post: &VideoPost) -> Result<String, PublishError> {
        if !post.video_path.exists() {
            return Err(PublishError::InputNotFound {
                path: post.video_path.clone(),
            });
        }

        let token = self.access_token().await?;
        let session_url = self.open_session(&token, post).await?;
        let bytes = tokio::fs::read(&post.video_path).await?;
        self.upload_bytes(&token, &session_url, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> YouTubeConfig {
        YouTubeConfig {
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
            category_id: 22,
            privacy_status: "public".to_string(),
        }
    }

    #[test]
    fn test_video_resource_serialization() {
        let tags = vec!["motivation".to_string()];
        let resource = VideoResource {
            snippet: Snippet {
                title: "Keep Going",
                description: "desc",
                tags: &tags,
                category_id: "22".to_string(),
            },
            status: UploadStatus {
                privacy_status: "public",
                self_declared_made_for_kids: false,
            },
        };

        let json = serde_json::to_string(&resource).unwrap();
        assert!(json.contains("\"categoryId\":\"22\""));
        assert!(json.contains("\"privacyStatus\":\"public\""));
        assert!(json.contains("\"selfDeclaredMadeForKids\":false"));
    }

    #[test]
    fn test_custom_endpoints() {
        let publisher = YouTubePublisher::new(config())
            .with_endpoints("http://localhost:9104/token", "http://localhost:9104/upload");
        assert_eq!(publisher.token_url, "http://localhost:9104/token");
        assert_eq!(publisher.upload_url, "http://localhost:9104/upload");
    }

    #[tokio::test]
    async fn test_publish_missing_input_fails() {
        let publisher = YouTubePublisher::new(config());
        let post = VideoPost {
            video_path: PathBuf::from("/nonexistent/output_video.mp4"),
            video_url: None,
            title: "T".to_string(),
            description: String::new(),
            tags: vec![],
        };

        let err = publisher.publish(&post).await.unwrap_err();
        assert!(matches!(err, PublishError::InputNotFound { .. }));
    }
}
