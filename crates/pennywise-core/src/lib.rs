//! Pennywise Core Library
//!
//! Shared functionality for the Pennywise expense tracker:
//! - CSV ledger storage with atomic rewrites
//! - Category aggregation, month and recency filters
//! - Monthly budget evaluation and rule-based insights
//! - Prompt library and summary/chat prompt builders
//! - Pluggable LLM backends (Gemini, OpenAI-compatible, mock)
//! - Model router for task-based model selection
//!
//! Every function that depends on "today" takes the date as a parameter.

pub mod aggregate;
pub mod ai;
pub mod budget;
pub mod config;
pub mod error;
pub mod insights;
pub mod model_router;
pub mod models;
pub mod prompts;
pub mod store;
pub mod summary;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    Assistant, GeminiBackend, LlmBackend, LlmClient, MockBackend, OpenAICompatibleBackend,
};
pub use config::{Config, LlmConfig, LlmProvider};
pub use error::{Error, LlmError, LlmResult, Result};
pub use insights::Insight;
pub use model_router::{ModelRouter, RouterConfig, TaskConfig, TaskType};
pub use models::{
    BudgetState, BudgetStatus, Category, CategoryAggregate, ExpenseLedger, ExpenseRecord,
    NewExpense, YearMonth,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use store::ExpenseStore;
pub use summary::{build_chat_prompt, build_monthly_summary_prompt, format_amount};
