//! LLM client abstraction and the Gemini implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error type for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Empty completion returned by {model}")]
    EmptyCompletion { model: String },

    #[error("Request timed out")]
    Timeout,
}

impl LlmError {
    /// Whether this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyCompletion { .. } => false,
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System instruction for the model.
    pub system: Option<String>,
    /// User message.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, higher = creative).
    pub temperature: f32,
    /// Ask the provider for a strict-JSON response body.
    pub json_output: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.9,
            json_output: false,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// The generated text.
    pub text: String,
    /// Token usage.
    pub usage: LlmUsage,
    /// Model that produced the response.
    pub model: String,
}

/// Trait for LLM clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g. "gemini").
    fn provider(&self) -> &str;

    /// Model name (e.g. "gemini-1.5-flash").
    fn model(&self) -> &str;

    /// Send a completion request and get a text response.
    async fn complete(&self, request: GenerationRequest)
        -> Result<GenerationResponse, LlmError>;
}

// ============================================================================
// Gemini Implementation
// ============================================================================

/// Google Gemini API client.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
            api_key: api_key.into(),
            model: model.into(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: GeminiUsage,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, LlmError> {
        let gemini_request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: request.prompt,
                }],
            }],
            system_instruction: request.system.map(|text| GeminiContent {
                parts: vec![GeminiPart { text }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: request
                    .json_output
                    .then(|| "application/json".to_string()),
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent?key={}",
                self.api_base,
                self.model,
                urlencoding::encode(&self.api_key)
            ))
            .header("content-type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Http(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(LlmError::Api { status, message });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Http(format!("Failed to read response body: {e}")))?;

        let text = gemini_response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(LlmError::EmptyCompletion {
                model: self.model.clone(),
            });
        }

        Ok(GenerationResponse {
            text,
            usage: LlmUsage {
                input_tokens: gemini_response.usage_metadata.prompt_token_count,
                output_tokens: gemini_response.usage_metadata.candidates_token_count,
            },
            model: gemini_response
                .model_version
                .unwrap_or_else(|| self.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_request_builder() {
        let request = GenerationRequest::new("Write a quote")
            .with_system("You are concise")
            .with_max_tokens(256)
            .with_temperature(0.5)
            .with_json_output();

        assert_eq!(request.prompt, "Write a quote");
        assert_eq!(request.system, Some("You are concise".to_string()));
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.temperature, 0.5);
        assert!(request.json_output);
    }

    #[test]
    fn test_gemini_client_creation() {
        let client = GeminiClient::new("key", "gemini-1.5-flash", 60);
        assert_eq!(client.provider(), "gemini");
        assert_eq!(client.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_gemini_client_custom_base() {
        let client =
            GeminiClient::new("key", "gemini-1.5-flash", 60).with_api_base("http://localhost:8099");
        assert_eq!(client.api_base, "http://localhost:8099");
    }

    #[test]
    fn test_gemini_request_serialization() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "Hello".to_string(),
                }],
            }],
            system_instruction: None,
            generation_config: GeminiGenerationConfig {
                temperature: 0.9,
                max_output_tokens: 512,
                response_mime_type: Some("application/json".to_string()),
            },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"maxOutputTokens\":512"));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
        assert!(!json.contains("systemInstruction"));
    }

    #[test]
    fn test_api_error_retryability() {
        assert!(LlmError::Api {
            status: 503,
            message: "overloaded".into()
        }
        .is_retryable());
        assert!(LlmError::Api {
            status: 429,
            message: "rate limited".into()
        }
        .is_retryable());
        assert!(!LlmError::Api {
            status: 400,
            message: "bad request".into()
        }
        .is_retryable());
        assert!(LlmError::Timeout.is_retryable());
    }
}
