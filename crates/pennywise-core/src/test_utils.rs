//! Test utilities for pennywise-core
//!
//! This module provides a mock Gemini server that speaks enough of the
//! Generative Language API for integration tests: successful replies,
//! provider errors (auth, quota, anything else) and slow replies.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// How the mock server answers generateContent calls
#[derive(Debug, Clone)]
pub enum MockMode {
    /// 200 with this text as the only candidate
    Reply(String),
    /// Google error envelope with this HTTP status
    Error {
        status: u16,
        code: String,
        message: String,
    },
    /// Sleep, then reply
    Slow { delay: Duration, reply: String },
}

impl MockMode {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply(text.into())
    }

    pub fn invalid_key() -> Self {
        Self::Error {
            status: 400,
            code: "INVALID_ARGUMENT".to_string(),
            message: "API key not valid. Please pass a valid API key.".to_string(),
        }
    }

    pub fn quota_exceeded() -> Self {
        Self::Error {
            status: 429,
            code: "RESOURCE_EXHAUSTED".to_string(),
            message: "Resource has been exhausted (e.g. check quota).".to_string(),
        }
    }

    pub fn server_error() -> Self {
        Self::Error {
            status: 500,
            code: "INTERNAL".to_string(),
            message: "An internal error has occurred.".to_string(),
        }
    }
}

/// A generateContent call as the server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub model: String,
    pub prompt: String,
    pub api_key: Option<String>,
}

#[derive(Clone)]
struct ServerState {
    mode: MockMode,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock Gemini server for testing
pub struct MockGeminiServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start a server that answers with a fixed summary
    pub async fn start() -> Self {
        Self::start_with(MockMode::reply(
            "You spent most on Food this month. Try cooking at home twice a week.",
        ))
        .await
    }

    /// Start the mock server on an available port
    pub async fn start_with(mode: MockMode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            mode,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1beta/models", get(handle_list_models))
            .route("/v1beta/models/:call", post(handle_generate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn error_response(status: u16, code: &str, message: &str) -> Response {
    let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({
        "error": {
            "code": status,
            "message": message,
            "status": code,
        }
    });
    (status_code, Json(body)).into_response()
}

fn reply_response(text: &str) -> Response {
    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP",
            "index": 0
        }]
    }))
    .into_response()
}

/// Model list endpoint (health check)
async fn handle_list_models(headers: HeaderMap) -> Response {
    if !headers.contains_key("x-goog-api-key") {
        return error_response(403, "PERMISSION_DENIED", "Method doesn't allow unregistered callers");
    }
    Json(json!({
        "models": [
            { "name": "models/gemini-1.5-flash" },
            { "name": "models/gemini-1.5-pro-latest" }
        ]
    }))
    .into_response()
}

/// generateContent endpoint; the path segment is `{model}:generateContent`
async fn handle_generate(
    State(state): State<ServerState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(model) = call.strip_suffix(":generateContent") else {
        return error_response(404, "NOT_FOUND", "Unknown method");
    };

    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    if let Ok(mut requests) = state.requests.lock() {
        requests.push(RecordedRequest {
            model: model.to_string(),
            prompt,
            api_key: api_key.clone(),
        });
    }

    if api_key.is_none() {
        return error_response(403, "PERMISSION_DENIED", "Method doesn't allow unregistered callers");
    }

    match &state.mode {
        MockMode::Reply(text) => reply_response(text),
        MockMode::Error {
            status,
            code,
            message,
        } => error_response(*status, code, message),
        MockMode::Slow { delay, reply } => {
            tokio::time::sleep(*delay).await;
            reply_response(reply)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GeminiBackend, LlmBackend};
    use crate::error::LlmError;

    #[tokio::test]
    async fn test_mock_server_health_check() {
        let server = MockGeminiServer::start().await;
        let client = GeminiBackend::new(&server.url(), Some("test-key".into()));
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_server_reply() {
        let server = MockGeminiServer::start_with(MockMode::reply("Spend less on taxis.")).await;
        let client = GeminiBackend::new(&server.url(), Some("test-key".into()));

        let text = client.generate("gemini-1.5-flash", "How am I doing?").await.unwrap();
        assert_eq!(text, "Spend less on taxis.");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gemini-1.5-flash");
        assert_eq!(requests[0].prompt, "How am I doing?");
        assert_eq!(requests[0].api_key.as_deref(), Some("test-key"));
    }

    #[tokio::test]
    async fn test_mock_server_invalid_key() {
        let server = MockGeminiServer::start_with(MockMode::invalid_key()).await;
        let client = GeminiBackend::new(&server.url(), Some("wrong".into()));

        let err = client.generate("gemini-1.5-flash", "hi").await.unwrap_err();
        assert_eq!(
            err,
            LlmError::Auth("API key not valid. Please pass a valid API key.".into())
        );
    }

    #[tokio::test]
    async fn test_mock_server_quota() {
        let server = MockGeminiServer::start_with(MockMode::quota_exceeded()).await;
        let client = GeminiBackend::new(&server.url(), Some("test-key".into()));

        let err = client.generate("gemini-1.5-pro-latest", "hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Quota(_)));
    }

    #[tokio::test]
    async fn test_mock_server_internal_error() {
        let server = MockGeminiServer::start_with(MockMode::server_error()).await;
        let client = GeminiBackend::new(&server.url(), Some("test-key".into()));

        let err = client.generate("gemini-1.5-flash", "hi").await.unwrap_err();
        assert_eq!(
            err,
            LlmError::Provider {
                status: 500,
                message: "An internal error has occurred.".into()
            }
        );
    }
}
