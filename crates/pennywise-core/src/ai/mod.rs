//! Pluggable LLM backend abstraction
//!
//! Aggregated spending data is sent to a hosted LLM to get a monthly summary
//! or an answer to a free-form question. This module hides which provider
//! does the work.
//!
//! # Architecture
//!
//! - `LlmBackend` trait: one text-in, text-out operation plus diagnostics
//! - `LlmClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OpenAICompatibleBackend`, `MockBackend`
//! - `Assistant`: picks the model and timeout for a task and makes the call
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = LlmClient::from_config(&config.llm);
//! let assistant = Assistant::new(client, ModelRouter::default());
//!
//! let prompt = build_monthly_summary_prompt(&mut prompts, &ledger, today, "₹")?;
//! match assistant.summarize(TaskType::MonthlySummary, &prompt).await {
//!     Ok(text) => println!("{}", text),
//!     Err(e) => eprintln!("AI summary failed: {}", e),
//! }
//! ```
//!
//! Every call is a single attempt bounded by the task timeout. Failures come
//! back as `LlmError` with the provider's message kept.

mod gemini;
mod mock;
mod openai_compatible;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{LlmError, LlmResult};
use crate::model_router::{ModelRouter, TaskType};

/// Trait implemented by every LLM provider
///
/// Backends must be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Send one prompt to `model` and return the generated text
    async fn generate(&self, model: &str, prompt: &str) -> LlmResult<String>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> bool;

    /// Which provider this backend talks to
    fn provider(&self) -> LlmProvider;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete LLM client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum LlmClient {
    /// Google Generative Language API
    Gemini(GeminiBackend),
    /// OpenAI-compatible server (vLLM, LocalAI, llama-server, hosted APIs)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl LlmClient {
    /// Create a client from configuration, reading the API key from the
    /// environment variable the config names
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::from_config_with_key(config, config.api_key())
    }

    /// Create a client from configuration with an explicit API key
    ///
    /// A missing key is not an error here. Gemini calls fail with
    /// `LlmError::NotConfigured` when attempted.
    pub fn from_config_with_key(config: &LlmConfig, api_key: Option<String>) -> Self {
        match config.backend {
            LlmProvider::Gemini => {
                let host = config.host.as_deref().unwrap_or(gemini::DEFAULT_HOST);
                LlmClient::Gemini(GeminiBackend::new(host, api_key))
            }
            LlmProvider::OpenaiCompatible => {
                let host = config
                    .host
                    .as_deref()
                    .unwrap_or(openai_compatible::DEFAULT_HOST);
                LlmClient::OpenAICompatible(OpenAICompatibleBackend::new(host, api_key))
            }
            LlmProvider::Mock => LlmClient::Mock(MockBackend::new()),
        }
    }

    /// Create a Gemini backend directly
    pub fn gemini(host: &str, api_key: &str) -> Self {
        LlmClient::Gemini(GeminiBackend::new(host, Some(api_key.to_string())))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        LlmClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl LlmBackend for LlmClient {
    async fn generate(&self, model: &str, prompt: &str) -> LlmResult<String> {
        match self {
            LlmClient::Gemini(b) => b.generate(model, prompt).await,
            LlmClient::OpenAICompatible(b) => b.generate(model, prompt).await,
            LlmClient::Mock(b) => b.generate(model, prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            LlmClient::Gemini(b) => b.health_check().await,
            LlmClient::OpenAICompatible(b) => b.health_check().await,
            LlmClient::Mock(b) => b.health_check().await,
        }
    }

    fn provider(&self) -> LlmProvider {
        match self {
            LlmClient::Gemini(b) => b.provider(),
            LlmClient::OpenAICompatible(b) => b.provider(),
            LlmClient::Mock(b) => b.provider(),
        }
    }

    fn host(&self) -> &str {
        match self {
            LlmClient::Gemini(b) => b.host(),
            LlmClient::OpenAICompatible(b) => b.host(),
            LlmClient::Mock(b) => b.host(),
        }
    }
}

/// Task-aware front end to an `LlmClient`
#[derive(Clone)]
pub struct Assistant {
    client: LlmClient,
    router: ModelRouter,
}

impl Assistant {
    pub fn new(client: LlmClient, router: ModelRouter) -> Self {
        Self { client, router }
    }

    /// Send a prompt using the model and timeout configured for `task`
    ///
    /// The reply is trimmed. An empty reply is a `MalformedResponse`.
    pub async fn summarize(&self, task: TaskType, prompt: &str) -> LlmResult<String> {
        let config = self.router.config_for_task(task);
        debug!(
            task = task.as_str(),
            model = %config.model,
            provider = self.client.provider().as_str(),
            prompt_len = prompt.len(),
            "Sending LLM request"
        );

        let reply = match tokio::time::timeout(
            config.timeout,
            self.client.generate(&config.model, prompt),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(config.timeout)),
        };

        let text = reply.inspect_err(|e| {
            warn!(task = task.as_str(), model = %config.model, error = %e, "LLM call failed");
        })?;

        let text = text.trim();
        if text.is_empty() {
            warn!(task = task.as_str(), model = %config.model, "LLM returned an empty reply");
            return Err(LlmError::MalformedResponse("empty reply".into()));
        }
        Ok(text.to_string())
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    pub fn router(&self) -> &ModelRouter {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::model_router::{RouterConfig, TaskConfig};

    fn router(timeout: Duration) -> ModelRouter {
        let mut tasks = HashMap::new();
        tasks.insert(
            TaskType::MonthlySummary,
            TaskConfig {
                model: "pro".to_string(),
                timeout,
            },
        );
        tasks.insert(
            TaskType::Chat,
            TaskConfig {
                model: "flash".to_string(),
                timeout,
            },
        );
        ModelRouter::with_config(RouterConfig {
            tasks,
            ..Default::default()
        })
    }

    #[test]
    fn test_from_config_selects_backend() {
        let mut config = LlmConfig::default();
        let client = LlmClient::from_config_with_key(&config, None);
        assert_eq!(client.provider(), LlmProvider::Gemini);
        assert_eq!(client.host(), gemini::DEFAULT_HOST);

        config.backend = LlmProvider::OpenaiCompatible;
        config.host = Some("http://localhost:8080/".to_string());
        let client = LlmClient::from_config_with_key(&config, Some("sk-test".into()));
        assert_eq!(client.provider(), LlmProvider::OpenaiCompatible);
        assert_eq!(client.host(), "http://localhost:8080");

        config.backend = LlmProvider::Mock;
        let client = LlmClient::from_config_with_key(&config, None);
        assert_eq!(client.provider(), LlmProvider::Mock);
    }

    #[tokio::test]
    async fn test_summarize_routes_model_by_task() {
        let assistant = Assistant::new(
            LlmClient::Mock(MockBackend::echo_model()),
            router(Duration::from_secs(5)),
        );

        let summary = assistant
            .summarize(TaskType::MonthlySummary, "summarize")
            .await
            .unwrap();
        assert_eq!(summary, "pro");

        let answer = assistant.summarize(TaskType::Chat, "question").await.unwrap();
        assert_eq!(answer, "flash");
    }

    #[tokio::test]
    async fn test_summarize_trims_reply() {
        let assistant = Assistant::new(
            LlmClient::Mock(MockBackend::with_reply("  You spent most on Food.\n\n")),
            router(Duration::from_secs(5)),
        );
        let text = assistant.summarize(TaskType::Chat, "q").await.unwrap();
        assert_eq!(text, "You spent most on Food.");
    }

    #[tokio::test]
    async fn test_summarize_empty_reply_is_malformed() {
        let assistant = Assistant::new(
            LlmClient::Mock(MockBackend::with_reply("   ")),
            router(Duration::from_secs(5)),
        );
        let err = assistant.summarize(TaskType::Chat, "q").await.unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_summarize_preserves_failure_message() {
        let assistant = Assistant::new(
            LlmClient::Mock(MockBackend::failing(LlmError::Quota(
                "Resource has been exhausted".into(),
            ))),
            router(Duration::from_secs(5)),
        );
        let err = assistant.summarize(TaskType::Chat, "q").await.unwrap_err();
        assert_eq!(err, LlmError::Quota("Resource has been exhausted".into()));
        assert_eq!(err.reason(), "Resource has been exhausted");
    }

    #[tokio::test]
    async fn test_summarize_times_out() {
        let assistant = Assistant::new(
            LlmClient::Mock(MockBackend::with_reply("late").with_delay(Duration::from_millis(500))),
            router(Duration::from_millis(20)),
        );
        let err = assistant.summarize(TaskType::MonthlySummary, "q").await.unwrap_err();
        assert_eq!(err, LlmError::Timeout(Duration::from_millis(20)));
    }
}
