//! Google Gemini backend
//!
//! Talks to the Generative Language REST API:
//! `POST {host}/v1beta/models/{model}:generateContent`
//!
//! The API key travels in the `x-goog-api-key` header. It is read from the
//! environment variable named in the config, never from a file.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmProvider;
use crate::error::{LlmError, LlmResult};

use super::LlmBackend;

pub(crate) const DEFAULT_HOST: &str = "https://generativelanguage.googleapis.com";

/// Gemini backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn api_key(&self) -> LlmResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            LlmError::NotConfigured("no Gemini API key set (see llm.api_key_env)".into())
        })
    }
}

/// generateContent request
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// generateContent response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> LlmResult<String> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "no candidates in response".to_string());
            return Err(LlmError::MalformedResponse(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(text)
    }
}

/// Map a non-success response to an `LlmError`
///
/// Gemini reports an invalid key as 400 INVALID_ARGUMENT, so the message is
/// checked as well as the status code.
fn classify_error(status: u16, body: &str) -> LlmError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return LlmError::from_status(status, body.trim());
    };
    let ErrorBody { message, status: code } = envelope.error;

    match code.as_str() {
        "UNAUTHENTICATED" | "PERMISSION_DENIED" => LlmError::Auth(message),
        "RESOURCE_EXHAUSTED" => LlmError::Quota(message),
        _ if message.contains("API key not valid") => LlmError::Auth(message),
        _ => LlmError::from_status(status, message),
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn generate(&self, model: &str, prompt: &str) -> LlmResult<String> {
        let api_key = self.api_key()?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http_client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body));
        }

        let body: GenerateContentResponse = response.json().await?;
        let text = body.into_text()?;
        debug!(model, reply_len = text.len(), "Gemini response");
        Ok(text)
    }

    async fn health_check(&self) -> bool {
        let Ok(api_key) = self.api_key() else {
            return false;
        };

        match self
            .http_client
            .get(format!("{}/v1beta/models", self.base_url))
            .header("x-goog-api-key", api_key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Gemini
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = GeminiBackend::new("https://example.test/", None);
        assert_eq!(backend.host(), "https://example.test");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let backend = GeminiBackend::new("http://localhost:9", None);
        let err = backend.generate("gemini-1.5-flash", "hi").await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
        assert!(!backend.health_check().await);
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: "Hello".to_string(),
                }],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "You spent "}, {"text": "₹180 in May."}]
                },
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 42}
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().unwrap(), "You spent ₹180 in May.");
    }

    #[test]
    fn test_blocked_prompt_is_malformed() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.into_text().unwrap_err(),
            LlmError::MalformedResponse("prompt blocked: SAFETY".into())
        );
    }

    #[test]
    fn test_classify_error() {
        let invalid_key = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(classify_error(400, invalid_key), LlmError::Auth(_)));

        let quota = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            classify_error(429, quota),
            LlmError::Quota("Resource has been exhausted".into())
        );

        let not_found = r#"{"error": {"code": 404, "message": "models/nope is not found", "status": "NOT_FOUND"}}"#;
        assert_eq!(
            classify_error(404, not_found),
            LlmError::Provider {
                status: 404,
                message: "models/nope is not found".into()
            }
        );

        assert_eq!(
            classify_error(502, "Bad Gateway\n"),
            LlmError::Provider {
                status: 502,
                message: "Bad Gateway".into()
            }
        );
    }
}
