//! Facebook page publisher: session-based chunked upload.
//!
//! Protocol: `upload_phase=start` opens a session and names the first byte
//! range, `transfer` sends chunks at the server-directed offsets until the
//! server reports `start_offset == end_offset`, `finish` attaches the post
//! metadata and closes the session.

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::FacebookConfig;

use super::error::{map_transport_error, PublishError};
use super::traits::PlatformPublisher;
use super::types::VideoPost;

const GRAPH_API_BASE: &str = "https://graph-video.facebook.com";
const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
struct StartResponse {
    upload_session_id: String,
    video_id: String,
    start_offset: String,
    end_offset: String,
}

#[derive(Debug, Deserialize)]
struct TransferResponse {
    start_offset: String,
    end_offset: String,
}

#[derive(Debug, Deserialize)]
struct FinishResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    message: String,
}

/// Facebook page implementation of [`PlatformPublisher`].
pub struct FacebookPublisher {
    client: Client,
    config: FacebookConfig,
    api_base: String,
}

impl FacebookPublisher {
    pub fn new(config: FacebookConfig) -> Self {
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

    fn videos_url(&self) -> String {
        format!(
            "{}/{}/{}/videos",
            self.api_base, self.config.api_version, self.config.page_id
        )
    }

    async fn start_session(&self, file_size: u64) -> Result<StartResponse, PublishError> {
        let response = self
            .client
            .post(self.videos_url())
            .form(&[
                ("upload_phase", "start"),
                ("access_token", self.config.page_token.as_str()),
                ("file_size", file_size.to_string().as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        parse_graph_response(response).await
    }

    async fn transfer_chunk(
        &self,
        session_id: &str,
        start_offset: u64,
        chunk: Vec<u8>,
    ) -> Result<TransferResponse, PublishError> {
        let part = multipart::Part::bytes(chunk)
            .file_name("chunk")
            .mime_str("application/octet-stream")
            .map_err(|e| PublishError::Protocol(e.to_string()))?;

        let form = multipart::Form::new()
            .text("upload_phase", "transfer")
            .text("upload_session_id", session_id.to_string())
            .text("start_offset", start_offset.to_string())
            .text("access_token", self.config.page_token.clone())
            .part("video_file_chunk", part);

        let response = self
            .client
            .post(self.videos_url())
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        parse_graph_response(response).await
    }

    async fn finish_session(
        &self,
        session_id: &str,
        post: &VideoPost,
    ) -> Result<(), PublishError> {
        let response = self
            .client
            .post(self.videos_url())
            .form(&[
                ("upload_phase", "finish"),
                ("upload_session_id", session_id),
                ("access_token", self.config.page_token.as_str()),
                ("title", post.title.as_str()),
                ("description", post.caption().as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let finish: FinishResponse = parse_graph_response(response).await?;
        if !finish.success {
            return Err(PublishError::Protocol(
                "finish phase reported success=false".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformPublisher for FacebookPublisher {
    fn platform(&self) -> &str {
        "facebook"
    }

    async fn publish(&self, post: &VideoPost) -> Result<String, PublishError> {
        if !post.video_path.exists() {
            return Err(PublishError::InputNotFound {
                path: post.video_path.clone(),
            });
        }

        let bytes = tokio::fs::read(&post.video_path).await?;
        let file_size = bytes.len() as u64;

        let start = self.start_session(file_size).await?;
        let session_id = start.upload_session_id;
        let mut start_offset = parse_offset(&start.start_offset)?;
        let mut end_offset = parse_offset(&start.end_offset)?;

        while start_offset < end_offset {
            let end = end_offset.min(file_size) as usize;
            let chunk = bytes[start_offset as usize..end].to_vec();
            debug!(
                session = %session_id,
                start_offset,
                end_offset,
                "Transferring video chunk"
            );

            let transfer = self
                .transfer_chunk(&session_id, start_offset, chunk)
                .await?;
            start_offset = parse_offset(&transfer.start_offset)?;
            end_offset = parse_offset(&transfer.end_offset)?;
        }

        self.finish_session(&session_id, post).await?;
        Ok(start.video_id)
    }
}

/// Graph upload offsets arrive as decimal strings.
fn parse_offset(raw: &str) -> Result<u64, PublishError> {
    raw.parse::<u64>()
        .map_err(|_| PublishError::Protocol(format!("unparsable upload offset: {raw}")))
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

    #[test]
    fn test_videos_url() {
        let publisher = FacebookPublisher::new(FacebookConfig {
            api_version: "v19.0".to_string(),
            page_id: "1234".to_string(),
            page_token: "tok".to_string(),
        });
        assert_eq!(
            publisher.videos_url(),
            "https://graph-video.facebook.com/v19.0/1234/videos"
        );
    }

    #[test]
    fn test_custom_api_base() {
        let publisher = FacebookPublisher::new(FacebookConfig {
            api_version: "v19.0".to_string(),
            page_id: "1234".to_string(),
            page_token: "tok".to_string(),
        })
        .with_api_base("http://localhost:9101");
        assert_eq!(publisher.videos_url(), "http://localhost:9101/v19.0/1234/videos");
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("1048576").unwrap(), 1048576);
        assert!(matches!(
            parse_offset("not-a-number"),
            Err(PublishError::Protocol(_))
        ));
    }

    #[test]
    fn test_start_response_deserialization() {
        let json = r#"{
            "upload_session_id": "789",
            "video_id": "456",
            "start_offset": "0",
            "end_offset": "1048576"
        }"#;
        let start: StartResponse = serde_json::from_str(json).unwrap();
        assert_eq!(start.upload_session_id, "789");
        assert_eq!(start.video_id, "456");
    }
}
