//! Shared command setup: configuration, ledger store and AI assistant

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pennywise_core::config::default_config_path;
use pennywise_core::{Assistant, Config, ExpenseLedger, ExpenseStore, LlmClient, ModelRouter};

/// Everything a command needs, resolved once at startup
pub struct AppContext {
    pub config: Config,
    pub store: ExpenseStore,
    /// Config file that was read, if any
    pub config_source: Option<PathBuf>,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let store = ExpenseStore::new(config.ledger_path.clone());
        Self {
            config,
            store,
            config_source: None,
        }
    }

    /// Load the ledger with the file path in the error message
    pub fn load_ledger(&self) -> Result<ExpenseLedger> {
        self.store
            .load()
            .with_context(|| format!("Failed to load ledger {}", self.store.path().display()))
    }
}

/// Resolve config (file + env) and apply the --ledger override
pub fn load_context(config_path: Option<&Path>, ledger: Option<&Path>) -> Result<AppContext> {
    let mut config = Config::load(config_path).context("Failed to load configuration")?;
    if let Some(path) = ledger {
        config.ledger_path = path.to_path_buf();
    }
    let mut ctx = AppContext::new(config);
    ctx.config_source = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };
    Ok(ctx)
}

/// Build the assistant for AI commands
pub fn build_assistant(config: &Config) -> Result<Assistant> {
    let client = LlmClient::from_config(&config.llm);
    let router = ModelRouter::new().context("Failed to load model routing config")?;
    Ok(Assistant::new(client, router))
}
