//! Mock backend for testing
//!
//! Returns a canned reply or a simulated failure without touching the
//! network. Useful for unit tests and for running the CLI offline.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::LlmProvider;
use crate::error::{LlmError, LlmResult};

use super::LlmBackend;

const DEFAULT_REPLY: &str =
    "Most of your money went to your top category this month. Set a weekly cap for it.";

#[derive(Clone, Debug)]
enum Behavior {
    Reply(String),
    EchoModel,
    Fail(LlmError),
}

/// Mock LLM backend for testing
#[derive(Clone, Debug)]
pub struct MockBackend {
    behavior: Behavior,
    delay: Option<Duration>,
    /// Whether health_check should return true
    pub healthy: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend with a generic canned reply
    pub fn new() -> Self {
        Self::with_reply(DEFAULT_REPLY)
    }

    /// Always answer with `reply`
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Reply(reply.into()),
            delay: None,
            healthy: true,
        }
    }

    /// Answer with the model name the call was routed to
    pub fn echo_model() -> Self {
        Self {
            behavior: Behavior::EchoModel,
            delay: None,
            healthy: true,
        }
    }

    /// Fail every call with `error`
    pub fn failing(error: LlmError) -> Self {
        Self {
            behavior: Behavior::Fail(error),
            delay: None,
            healthy: false,
        }
    }

    /// Wait before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn generate(&self, model: &str, _prompt: &str) -> LlmResult<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Reply(reply) => Ok(reply.clone()),
            Behavior::EchoModel => Ok(model.to_string()),
            Behavior::Fail(err) => Err(err.clone()),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Mock
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
