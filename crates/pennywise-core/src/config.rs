//! Application configuration
//!
//! Loaded once at startup and passed explicitly to the store and the LLM
//! client. Resolution order:
//! 1. Built-in defaults
//! 2. Config file (`--config <path>`, or ~/.config/pennywise/config.toml if present)
//! 3. Environment overrides (`PENNYWISE_LEDGER`, `PENNYWISE_CURRENCY`,
//!    `PENNYWISE_LLM_BACKEND`, `PENNYWISE_LLM_HOST`)
//!
//! The LLM API key is never stored in the file. The file only names the
//! environment variable that holds it (`GEMINI_API_KEY` by default).
//!
//! ```toml
//! ledger_path = "~/finance/expenses.csv"
//! currency = "₹"
//! monthly_budget = 20000
//!
//! [llm]
//! backend = "gemini"
//! api_key_env = "GEMINI_API_KEY"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::insights::DEFAULT_RECENT_DAYS;

pub const LEDGER_ENV: &str = "PENNYWISE_LEDGER";
pub const CURRENCY_ENV: &str = "PENNYWISE_CURRENCY";
pub const LLM_BACKEND_ENV: &str = "PENNYWISE_LLM_BACKEND";
pub const LLM_HOST_ENV: &str = "PENNYWISE_LLM_HOST";

/// Which LLM provider API to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Google Generative Language API
    #[default]
    Gemini,
    /// Any server implementing `/v1/chat/completions`
    OpenaiCompatible,
    /// Canned responses, no network
    Mock,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenaiCompatible => "openai_compatible",
            Self::Mock => "mock",
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                Ok(Self::OpenaiCompatible)
            }
            "mock" => Ok(Self::Mock),
            _ => Err(Error::Config(format!("Unknown LLM backend: {}", s))),
        }
    }
}

/// LLM client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: LlmProvider,
    /// Provider base URL; each backend has its own default
    pub host: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmProvider::default(),
            host: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    pub fn api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        lookup(&self.api_key_env).filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV ledger location
    pub ledger_path: PathBuf,
    /// Symbol printed before amounts
    pub currency: String,
    /// Default for `pennywise budget` when no amount is given
    pub monthly_budget: Option<f64>,
    /// Look-back window for the recent-spending insight
    pub recent_days: u32,
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("expenses.csv"),
            currency: "₹".to_string(),
            monthly_budget: None,
            recent_days: DEFAULT_RECENT_DAYS,
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file and the process environment
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = lookup(LEDGER_ENV) {
            self.ledger_path = PathBuf::from(path);
        }
        if let Some(currency) = lookup(CURRENCY_ENV) {
            self.currency = currency;
        }
        if let Some(backend) = lookup(LLM_BACKEND_ENV) {
            self.llm.backend = backend.parse()?;
        }
        if let Some(host) = lookup(LLM_HOST_ENV) {
            self.llm.host = Some(host);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if let Some(budget) = self.monthly_budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(Error::Config(format!(
                    "monthly_budget must be a non-negative number, got {}",
                    budget
                )));
            }
        }
        if self.llm.api_key_env.trim().is_empty() {
            return Err(Error::Config("llm.api_key_env must not be empty".into()));
        }
        Ok(())
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pennywise").join("config.toml"))
}
