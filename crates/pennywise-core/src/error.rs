//! Error types for Pennywise

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The ledger file does not exist yet. `ExpenseStore::load` recovers
    /// from this by returning an empty ledger.
    #[error("Ledger not found: {}", .0.display())]
    StorageNotFound(PathBuf),

    #[error("Malformed ledger {} (line {line}): {reason}", .path.display())]
    StorageMalformed {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Cannot pick a category from an empty aggregate")]
    EmptyAggregate,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single LLM provider call
///
/// Every variant keeps the provider's (or transport's) message so callers can
/// show it as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("LLM not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Provider error {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// The underlying message carried by this error
    pub fn reason(&self) -> String {
        match self {
            Self::NotConfigured(msg)
            | Self::Network(msg)
            | Self::Auth(msg)
            | Self::Quota(msg)
            | Self::MalformedResponse(msg) => msg.clone(),
            Self::Provider { message, .. } => message.clone(),
            Self::Timeout(after) => format!("no response within {}s", after.as_secs()),
        }
    }

    /// Classify a non-success HTTP status from a provider
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Auth(message),
            429 => Self::Quota(message),
            _ => Self::Provider { status, message },
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;
