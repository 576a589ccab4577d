//! Threads publisher: URL-based remote-fetch posting.
//!
//! Same container-then-publish shape as Instagram, against the Threads API
//! host with its own status field and text payload.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ThreadsConfig;

use super::error::{map_transport_error, PublishError};
use super::traits::PlatformPublisher;
use super::types::VideoPost;

const THREADS_API_BASE: &str = "https://graph.threads.net";
const REQUEST_TIMEOUT_SECS: u64 = 60;

const POLL_ATTEMPTS: u32 = 20;
const POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct ContainerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ThreadsError {
    error: ThreadsErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ThreadsErrorDetail {
    message: String,
}

/// Threads implementation of [`PlatformPublisher`].
pub struct ThreadsPublisher {
    client: Client,
    config: ThreadsConfig,
    api_base: String,
}

impl ThreadsPublisher {
    pub fn new(config: ThreadsConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            config,
            api_base: THREADS_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn create_container(
        &self,
        video_url: &str,
        text: &str,
    ) -> Result<String, PublishError> {
        let url = format!(
            "{}/{}/{}/threads",
            self.api_base, self.config.api_version, self.config.user_id
        );

        let response = self
            .client
            .post(url)
            .form(&[
                ("media_type", "VIDEO"),
                ("video_url", video_url),
                ("text", text),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let container: ContainerResponse = parse_threads_response(response).await?;
        Ok(container.id)
    }

    async fn await_container(&self, container_id: &str) -> Result<(), PublishError> {
        for attempt in 1..=POLL_ATTEMPTS {
            let url = format!(
                "{}/{}/{}",
                self.api_base, self.config.api_version, container_id
            );
            let response = self
                .client
                .get(url)
                .query(&[
                    ("fields", "status"),
                    ("access_token", self.config.access_token.as_str()),
                ])
                .send()
                .await
                .map_err(map_transport_error)?;

            let status: StatusResponse = parse_threads_response(response).await?;
            debug!(container = container_id, status = %status.status, attempt, "Container status");

            match status.status.as_str() {
                "FINISHED" => return Ok(()),
                "ERROR" | "EXPIRED" => {
                    return Err(PublishError::Protocol(format!(
                        "container entered status {}",
                        status.status
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
            "{}/{}/{}/threads_publish",
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

        let published: ContainerResponse = parse_threads_response(response).await?;
        Ok(published.id)
    }
}

#[async_trait]
impl PlatformPublisher for ThreadsPublisher {
    fn platform(&self) -> &str {
        "threads"
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

async fn parse_threads_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PublishError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(map_transport_error)?;

    if status != 200 {
        let message = serde_json::from_str::<ThreadsError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(PublishError::Api { status, message });
    }

    serde_json::from_str(&body).map_err(|e| PublishError::Protocol(e.to_string()))
}
