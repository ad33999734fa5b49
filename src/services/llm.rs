//! C3 — LLM Client

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Free,
    Json,
}

#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub response_format: ResponseFormat,
    pub timeout_ms: u64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: None,
            response_format: ResponseFormat::Free,
            timeout_ms: 30_000,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, AppError>;
}

/// Forgiving extraction of a JSON object from raw LLM output (spec §9):
/// strips markdown code fences if present, then slices from the first `{`
/// to the matching outermost `}`. No structural repair beyond that — a
/// malformed interior is still a parse failure for the caller to catch.
pub fn extract_json_object(raw: &str) -> &str {
    let stripped = raw.trim();
    let stripped = stripped
        .strip_prefix("```json")
        .or_else(|| stripped.strip_prefix("```"))
        .unwrap_or(stripped);
    let stripped = stripped.strip_suffix("```").unwrap_or(stripped).trim();

    let Some(start) = stripped.find('{') else {
        return stripped;
    };
    let Some(end) = stripped.rfind('}') else {
        return stripped;
    };
    if end < start {
        return stripped;
    }
    &stripped[start..=end]
}

#[cfg(test)]
mod json_extraction_tests {
    use super::extract_json_object;

    #[test]
    fn passes_through_bare_json() {
        assert_eq!(extract_json_object(r#"{"a":1}"#), r#"{"a":1}"#);
    }

    #[test]
    fn strips_markdown_fences() {
        let raw = "```json\n{\"a\":1}\n```";
        assert_eq!(extract_json_object(raw), "{\"a\":1}");
    }

    #[test]
    fn extracts_outermost_braces_from_surrounding_prose() {
        let raw = "Sure, here you go:\n{\"a\":1}\nHope that helps!";
        assert_eq!(extract_json_object(raw), r#"{"a":1}"#);
    }
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: String,
}

pub struct GeminiLlmClient {
    http: reqwest::Client,
    model_name: String,
    api_key: SecretString,
}

impl GeminiLlmClient {
    pub fn new(http: reqwest::Client, model_name: String, api_key: SecretString) -> Self {
        Self {
            http,
            model_name,
            api_key,
        }
    }
}

#[async_trait]
impl LlmClient for GeminiLlmClient {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String, AppError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model_name,
            self.api_key.expose_secret()
        );

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_output_tokens,
                response_mime_type: match options.response_format {
                    ResponseFormat::Json => Some("application/json"),
                    ResponseFormat::Free => None,
                },
            },
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .timeout(Duration::from_millis(options.timeout_ms))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("LLM request failed: {e}");
                if e.is_timeout() {
                    AppError::LLMTimeout
                } else {
                    AppError::LLMUnavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("LLM provider returned status {status}");
            return Err(AppError::LLMUnavailable(format!("LLM provider returned status {status}")));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("failed to decode LLM response: {e}");
            AppError::LLMUnavailable(e.to_string())
        })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AppError::LLMUnavailable("LLM returned no candidates".to_string()))
    }
}

#[cfg(test)]
pub mod stub {
    use super::*;
    use std::sync::Mutex;

    pub struct StubLlmClient {
        pub response: String,
        pub fail: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl StubLlmClient {
        pub fn ok(response: impl Into<String>) -> Self {
            Self {
                response: response.into(),
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                response: String::new(),
                fail: true,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for StubLlmClient {
        async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> Result<String, AppError> {
            self.calls.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(AppError::LLMUnavailable("stub configured to fail".to_string()));
            }
            Ok(self.response.clone())
        }
    }
}
