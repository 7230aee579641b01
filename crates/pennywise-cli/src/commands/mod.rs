//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `ai` - AI summary and question commands
//! - `config` - Show resolved configuration
//! - `core` - Shared setup (config, ledger store, assistant)
//! - `expenses` - Expense commands (add, list)
//! - `prompts` - Prompt library management commands
//! - `reports` - Category, insight and budget reports

pub mod ai;
pub mod config;
pub mod core;
pub mod expenses;
pub mod prompts;
pub mod reports;

// Re-export command functions for main.rs
pub use ai::*;
pub use config::*;
pub use core::*;
pub use expenses::*;
pub use prompts::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
