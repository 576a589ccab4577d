//! Mock LLM client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::generator::{GenerationRequest, GenerationResponse, LlmClient, LlmError, LlmUsage};

/// Default completion: a well-formed quote artifact.
const DEFAULT_COMPLETION: &str = r#"{
    "title": "Keep Going",
    "quote": "Small steps still move you forward.",
    "description": "A reminder for slow days.",
    "tags": ["motivation", "perseverance"]
}"#;

/// Mock implementation of the [`LlmClient`] trait.
///
/// Returns queued completions (falling back to a valid artifact), records
/// prompts, and fails on demand.
#[derive(Clone, Default)]
pub struct MockLlm {
    /// Queued completion texts, consumed front to back.
    responses: Arc<RwLock<Vec<String>>>,
    /// Recorded requests.
    requests: Arc<RwLock<Vec<GenerationRequest>>>,
    /// If set, the next completion fails with this error.
    next_error: Arc<RwLock<Option<LlmError>>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a completion text returned by an upcoming call.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.responses.write().await.push(text.into());
    }

    /// Configure the next completion to fail with the given error.
    pub async fn set_next_error(&self, error: LlmError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get the recorded requests.
    pub async fn recorded_requests(&self) -> Vec<GenerationRequest> {
        self.requests.read().await.clone()
    }

    /// Number of completion calls performed.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, LlmError> {
        self.requests.write().await.push(request);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let mut responses = self.responses.write().await;
        let text = if responses.is_empty() {
            DEFAULT_COMPLETION.to_string()
        } else {
            responses.remove(0)
        };

        Ok(GenerationResponse {
            text,
            usage: LlmUsage::default(),
            model: "mock-model".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_completion_is_valid_artifact() {
        let llm = MockLlm::new();
        let response = llm
            .complete(GenerationRequest::new("write a quote"))
            .await
            .unwrap();
        let artifact: crate::generator::QuoteArtifact =
            serde_json::from_str(&response.text).unwrap();
        assert!(!artifact.quote.is_empty());
    }

    #[tokio::test]
    async fn test_queued_responses_are_consumed_in_order() {
        let llm = MockLlm::new();
        llm.push_response("first").await;
        llm.push_response("second").await;

        let first = llm.complete(GenerationRequest::new("p")).await.unwrap();
        let second = llm.complete(GenerationRequest::new("p")).await.unwrap();
        assert_eq!(first.text, "first");
        assert_eq!(second.text, "second");
        assert_eq!(llm.request_count().await, 2);
    }
}
