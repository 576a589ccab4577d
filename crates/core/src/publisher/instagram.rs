//! Instagram publisher: URL-based remote-fetch posting.
//!
//! Protocol: create a REELS media container pointing at the remote video
//! URL, poll the container until the platform finishes fetching and
//! processing it, then publish the container.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::InstagramConfig;

use super::error::{map_transport_error, PublishError};
use super::traits::PlatformPublisher;
use super::types::VideoPost;

const GRAPH_API_BASE: &str = "https://graph.facebook.com";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// How many times to poll a processing container before giving up.
const POLL_ATTEMPTS: u32 = 20;
const POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct ContainerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status_code: String,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    message: String,
}

/// Instagram implementation of [`PlatformPublisher`].
pub struct InstagramPublisher {
    client: Client,
    config: InstagramConfig,
    api_base: String,
}

impl InstagramPublisher {
    pub fn new(config: InstagramConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            config,
            api_base: GRAPH_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn create_container(
        &self,
        video_url: &str,
        caption: &str,
    ) -> Result<String, PublishError> {
        let url = format!(
            "{}/{}/{}/media",
            self.api_base, self.config.api_version, self.config.user_id
        );

        let response = self
            .client
            .post(url)
            .form(&[
                ("media_type", "REELS"),
                ("video_url", video_url),
                ("caption", caption),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let container: ContainerResponse = parse_graph_response(response).await?;
        Ok(container.id)
    }

    /// Poll the container until the remote fetch finishes; the platform
    /// downloads the video asynchronously after container creation.
    async fn await_container(&self, container_id: &str) -> Result<(), PublishError> {
        for attempt in 1..=POLL_ATTEMPTS {
            let url = format!("{}/{}/{}", self.api_base, self.config.api_version, container_id);
            let response = self
                .client
                .get(url)
                .query(&[
                    ("fields", "status_code"),
                    ("access_token", self.config.access_token.as_str()),
                ])
                .send()
                .await
                .map_err(map_transport_error)?;

            let status: StatusResponse = parse_graph_response(response).await?;
            debug!(container = container_id, status = %status.status_code, attempt, "Container status");

            match status.status_code.as_str() {
                "FINISHED" => return Ok(()),
                "ERROR" | "EXPIRED" => {
                    return Err(PublishError::Protocol(format!(
                        "container entered status {}",
                        status.status_code
                    )));
                }
                _ => tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await,
            }
        }

        Err(PublishError::ProcessingTimeout {
            attempts: POLL_ATTEMPTS,
        })
    }

    async fn publish_container(&self, container_id: &str) -> Result<String, PublishError> {
        let url = format!(
            "{}/{}/{}/media_publish",
            self.api_base, self.config.api_version, self.config.user_id
        );

        let response = self
            .client
            .post(url)
            .form(&[
                ("creation_id", container_id),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let published: ContainerResponse = parse_graph_response(response).await?;
        Ok(published.id)
    }
}

#[async_trait]
impl PlatformPublisher for InstagramPublisher {
    fn platform(&self) -> &str {
        "instagram"
    }

    async fn publish(&self, post: &VideoPost) -> Result<String, PublishError> {
        let video_url = post
            .video_url
            .as_deref()
            .ok_or(PublishError::MissingRemoteUrl)?;

        let container_id = self.create_container(video_url, &post.caption()).await?;
        self.await_container(&container_id).await?;
        self.publish_container(&container_id).await
    }
}

async fn parse_graph_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PublishError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(map_transport_error)?;

    if status != 200 {
        let message = serde_json::from_str::<GraphError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(PublishError::Api { status, message });
    }

    serde_json::from_str(&body).map_err(|e| PublishError::Protocol(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn publisher() -> InstagramPublisher {
        InstagramPublisher::new(InstagramConfig {
            api_version: "v19.0".to_string(),
            user_id: "9876".to_string(),
            access_token: "tok".to_string(),
        })
    }

    #[tokio::test]
    async fn test_publish_without_remote_url_fails() {
        let post = VideoPost {
            video_path: PathBuf::from("output_video.mp4"),
            video_url: None,
            title: "T".to_string(),
            description: String::new(),
            tags: vec![],
        };

        let err = publisher().publish(&post).await.unwrap_err();
        assert!(matches!(err, PublishError::MissingRemoteUrl));
    }

    #[test]
    fn test_status_response_deserialization() {
        let status: StatusResponse =
            serde_json::from_str(r#"{"status_code": "IN_PROGRESS"}"#).unwrap();
        assert_eq!(status.status_code, "IN_PROGRESS");
    }

    #[test]
    fn test_custom_api_base() {
        let publisher = publisher().with_api_base("http://localhost:9102");
        assert_eq!(publisher.api_base, "http://localhost:9102");
    }
}
