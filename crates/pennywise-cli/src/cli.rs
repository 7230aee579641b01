//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pennywise - Track expenses and get AI spending summaries
#[derive(Parser)]
#[command(name = "pennywise")]
#[command(about = "Personal expense tracker with AI spending summaries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger CSV path (overrides config and PENNYWISE_LEDGER)
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// Config file path (default: ~/.config/pennywise/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new expense
    Add {
        /// Amount spent (must be positive)
        #[arg(short, long)]
        amount: f64,

        /// Category: Food, Transport, Groceries, Entertainment, Bills, Other, or your own
        #[arg(short, long)]
        category: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// What the money was spent on
        #[arg(long, default_value = "")]
        description: String,
    },

    /// List expenses, newest first
    List {
        /// Maximum number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show spending by category
    Categories,

    /// Show quick spending insights
    Insights {
        /// Look-back window for recent spending (defaults to config, 7 days)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Compare this month's spending against a budget
    Budget {
        /// Monthly budget (defaults to monthly_budget in config)
        #[arg(short, long)]
        amount: Option<f64>,
    },

    /// Get an AI summary of this month's spending
    Summary,

    /// Ask the AI assistant a question about your expenses
    Ask {
        /// The question (quote it or pass several words)
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Manage AI prompt templates
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },

    /// Show resolved configuration
    Config,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all prompts and their override status
    List,

    /// Show the content of a prompt
    Show {
        /// Prompt ID (e.g. monthly_summary)
        id: String,
    },

    /// Print the override directory
    Path,
}
