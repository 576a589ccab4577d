//! Quote generator built on an [`LlmClient`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ContentConfig;

use super::error::GenerationError;
use super::llm::{GenerationRequest, LlmClient};
use super::types::QuoteArtifact;

const SYSTEM_INSTRUCTION: &str = "You write short, original inspirational quotes \
for social media videos. Respond with a single JSON object and nothing else.";

const MAX_QUOTE_TOKENS: u32 = 512;

/// Produces the run's [`QuoteArtifact`] from steering parameters.
pub struct QuoteGenerator {
    client: Arc<dyn LlmClient>,
}

impl QuoteGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Generate a quote artifact and persist it into `work_dir`.
    ///
    /// On success the artifact file exists on disk and the returned value
    /// is the parsed, validated record.
    pub async fn generate(
        &self,
        content: &ContentConfig,
        work_dir: &Path,
    ) -> Result<(QuoteArtifact, PathBuf), GenerationError> {
        let request = GenerationRequest::new(build_prompt(content))
            .with_system(SYSTEM_INSTRUCTION)
            .with_max_tokens(MAX_QUOTE_TOKENS)
            .with_json_output();

        debug!(
            provider = self.client.provider(),
            model = self.client.model(),
            "Requesting quote generation"
        );

        let response = self.client.complete(request).await?;
        let artifact = parse_artifact(&response.text)?;

        let path = artifact.write_to(work_dir).await?;
        info!(
            title = %artifact.title,
            tags = artifact.tags.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Quote artifact generated"
        );

        Ok((artifact, path))
    }
}

/// Build the steering prompt from the configured content parameters.
fn build_prompt(content: &ContentConfig) -> String {
    format!(
        "Write one short inspirational quote in language \"{}\".\n\
         Pick a tone from these adjectives: {}.\n\
         Pick a subject from these themes: {}.\n\
         Return a JSON object with exactly these fields:\n\
         - \"title\": a catchy title of at most 8 words\n\
         - \"quote\": the quote itself, 10 to 30 words\n\
         - \"description\": one sentence describing the video\n\
         - \"tags\": 3 to 6 lowercase keyword strings",
        content.language,
        content.adjectives.join(", "),
        content.themes.join(", "),
    )
}

/// Parse and validate the model output into a usable artifact.
fn parse_artifact(text: &str) -> Result<QuoteArtifact, GenerationError> {
    let body = strip_code_fences(text);
    let artifact: QuoteArtifact = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedArtifact(e.to_string()))?;

    if artifact.quote.trim().is_empty() {
        return Err(GenerationError::MalformedArtifact(
            "quote field is empty".to_string(),
        ));
    }
    if artifact.title.trim().is_empty() {
        return Err(GenerationError::MalformedArtifact(
            "title field is empty".to_string(),
        ));
    }

    Ok(artifact)
}

/// Strip a markdown code fence if the model wrapped its JSON in one.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> ContentConfig {
        ContentConfig {
            adjectives: vec!["calm".to_string(), "bold".to_string()],
            themes: vec!["perseverance".to_string()],
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_prompt_includes_steering_parameters() {
        let prompt = build_prompt(&content());
        assert!(prompt.contains("calm, bold"));
        assert!(prompt.contains("perseverance"));
        assert!(prompt.contains("\"en\""));
        assert!(prompt.contains("\"quote\""));
    }

    #[test]
    fn test_parse_valid_artifact() {
        let artifact = parse_artifact(
            r#"{"title": "Keep Going", "quote": "One step at a time.", "description": "d", "tags": ["grit"]}"#,
        )
        .unwrap();
        assert_eq!(artifact.title, "Keep Going");
        assert_eq!(artifact.tags, vec!["grit"]);
    }

    #[test]
    fn test_parse_fenced_artifact() {
        let artifact = parse_artifact(
            "```json\n{\"title\": \"T\", \"quote\": \"Q\", \"description\": \"\", \"tags\": []}\n```",
        )
        .unwrap();
        assert_eq!(artifact.quote, "Q");
    }

    #[test]
    fn test_missing_quote_is_malformed() {
        let err = parse_artifact(r#"{"title": "T", "tags": []}"#).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedArtifact(_)));
    }

    #[test]
    fn test_empty_quote_is_malformed() {
        let err =
            parse_artifact(r#"{"title": "T", "quote": "  ", "description": "", "tags": []}"#)
                .unwrap_err();
        assert!(matches!(err, GenerationError::MalformedArtifact(_)));
    }
}
