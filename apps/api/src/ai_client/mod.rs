/// Analysis client — the single point of entry for all model calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion endpoint
/// directly, and nothing downstream of this module may consume raw model
/// JSON — every response passes through the schema validator first.
///
/// The client performs no retries. A failed call leaves the assessment
/// pending, and the polling surface decides whether to re-invoke.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;
pub mod schema;

use crate::config::AiConfig;
use crate::models::profile::ProfileAttributes;
use crate::models::riasec::RiasecScores;
use schema::{CareerAnalysis, DetailedPersonalityAnalysis};

/// Bound on how much raw/cleaned text is echoed into diagnostics. Protects
/// log volume; full payloads are never logged.
const SNIPPET_MAX_CHARS: usize = 500;

/// Upstream completion calls are slow but bounded; past this the call is
/// treated as failed and the credit stays spent for the attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("model returned empty content")]
    EmptyResponse,

    #[error("model output is not JSON; raw: {raw_snippet}; cleaned: {cleaned_snippet}")]
    MalformedJson {
        raw_snippet: String,
        cleaned_snippet: String,
    },

    #[error(transparent)]
    Schema(#[from] schema::SchemaError),
}

impl AiError {
    /// Stable label for the failing stage. Callers surface one retryable
    /// condition; logs keep the distinction.
    pub fn kind(&self) -> &'static str {
        match self {
            AiError::Http(_) => "http",
            AiError::Upstream { .. } => "upstream",
            AiError::EmptyResponse => "empty_response",
            AiError::MalformedJson { .. } => "malformed_json",
            AiError::Schema(_) => "schema_validation",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI-style chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    /// Asks the upstream service for JSON output where supported.
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Analyzer seam carried in `AppState` as `Arc<dyn CareerAnalyzer>` so the
/// pipeline and handlers never name the concrete HTTP client.
#[async_trait]
pub trait CareerAnalyzer: Send + Sync {
    async fn analyze_career_from_riasec(
        &self,
        scores: &RiasecScores,
    ) -> Result<CareerAnalysis, AiError>;

    async fn analyze_career_from_profile(
        &self,
        profile: &ProfileAttributes,
    ) -> Result<CareerAnalysis, AiError>;

    async fn analyze_personality(
        &self,
        scores: &RiasecScores,
    ) -> Result<DetailedPersonalityAnalysis, AiError>;
}

/// HTTP client for the configured chat-completions endpoint.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    config: AiConfig,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            config,
        }
    }

    /// One completion round-trip. Non-2xx statuses fail with the body
    /// preserved for diagnostics. Empty or missing content comes back as an
    /// empty string and is rejected downstream by `extract_json`.
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError> {
        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        debug!(model = %self.config.model, chars = content.len(), "completion received");
        Ok(content)
    }
}

#[async_trait]
impl CareerAnalyzer for AiClient {
    async fn analyze_career_from_riasec(
        &self,
        scores: &RiasecScores,
    ) -> Result<CareerAnalysis, AiError> {
        let prompt = prompts::riasec_career_prompt(scores);
        let raw = self.complete(prompts::CAREER_ADVISOR_SYSTEM, &prompt).await?;
        let value = extract_json(&raw)?;
        Ok(schema::validate_career_analysis(&value)?)
    }

    async fn analyze_career_from_profile(
        &self,
        profile: &ProfileAttributes,
    ) -> Result<CareerAnalysis, AiError> {
        let prompt = prompts::profile_career_prompt(profile);
        let raw = self.complete(prompts::CAREER_ADVISOR_SYSTEM, &prompt).await?;
        let value = extract_json(&raw)?;
        Ok(schema::validate_career_analysis(&value)?)
    }

    async fn analyze_personality(
        &self,
        scores: &RiasecScores,
    ) -> Result<DetailedPersonalityAnalysis, AiError> {
        let prompt = prompts::personality_prompt(scores);
        let raw = self
            .complete(prompts::PERSONALITY_ANALYST_SYSTEM, &prompt)
            .await?;
        let value = extract_json(&raw)?;
        Ok(schema::validate_personality_analysis(&value)?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// JSON recovery
// ────────────────────────────────────────────────────────────────────────────

/// Recovers a JSON value from possibly noisy model output.
///
/// Empty input fails immediately. Otherwise markdown code fences are
/// stripped; if the result still does not parse, the substring between the
/// first `{` and the last `}` is tried, because models sometimes prepend
/// reasoning text or wrap the JSON in prose.
pub fn extract_json(raw: &str) -> Result<serde_json::Value, AiError> {
    if raw.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }

    let cleaned = strip_json_fences(raw);
    if let Ok(value) = serde_json::from_str(cleaned) {
        return Ok(value);
    }

    let fallback = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => cleaned,
    };

    serde_json::from_str(fallback).map_err(|_| AiError::MalformedJson {
        raw_snippet: snippet(raw),
        cleaned_snippet: snippet(fallback),
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_from_fenced_block() {
        let input = "```json\n{\"a\":1}\n```";
        assert_eq!(extract_json(input).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_json_from_fence_without_tag() {
        let input = "```\n{\"a\":1}\n```";
        assert_eq!(extract_json(input).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_json_from_prose_wrapping() {
        let input = r#"Sure, here is the result: {"a":1} Hope that helps!"#;
        assert_eq!(extract_json(input).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_extract_json_clean_document_passthrough() {
        let input = r#"{"a": {"b": [1, 2]}}"#;
        assert_eq!(extract_json(input).unwrap(), json!({"a": {"b": [1, 2]}}));
    }

    #[test]
    fn test_extract_json_nested_braces_in_prose() {
        let input = r#"Reasoning first. {"outer": {"inner": 2}} Done."#;
        assert_eq!(
            extract_json(input).unwrap(),
            json!({"outer": {"inner": 2}})
        );
    }

    #[test]
    fn test_extract_json_empty_input_fails() {
        assert!(matches!(extract_json(""), Err(AiError::EmptyResponse)));
        assert!(matches!(extract_json("  \n "), Err(AiError::EmptyResponse)));
    }

    #[test]
    fn test_extract_json_garbage_fails_as_malformed() {
        let err = extract_json("not json at all").unwrap_err();
        assert!(matches!(err, AiError::MalformedJson { .. }));
    }

    #[test]
    fn test_malformed_error_carries_both_snippets() {
        let err = extract_json("prefix {broken json oops} suffix").unwrap_err();
        match err {
            AiError::MalformedJson {
                raw_snippet,
                cleaned_snippet,
            } => {
                assert!(raw_snippet.contains("prefix"));
                assert!(cleaned_snippet.starts_with('{'));
            }
            other => panic!("expected MalformedJson, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_snippets_are_bounded() {
        let input = format!("junk {} junk", "x".repeat(3000));
        let err = extract_json(&input).unwrap_err();
        match err {
            AiError::MalformedJson { raw_snippet, .. } => {
                assert!(raw_snippet.chars().count() <= SNIPPET_MAX_CHARS + 3);
            }
            other => panic!("expected MalformedJson, got {other:?}"),
        }
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        assert_eq!(AiError::EmptyResponse.kind(), "empty_response");
        assert_eq!(
            AiError::Upstream {
                status: 503,
                body: String::new()
            }
            .kind(),
            "upstream"
        );
        let malformed = extract_json("nope").unwrap_err();
        assert_eq!(malformed.kind(), "malformed_json");
    }
}
