//! Pennywise CLI - Personal expense tracker
//!
//! Usage:
//!   pennywise add -a 120 -c Food          Record an expense
//!   pennywise categories                  Spending by category
//!   pennywise budget --amount 5000        This month against a budget
//!   pennywise summary                     AI summary of this month
//!   pennywise ask "Where can I save?"     Ask the AI about your spending

mod cli;
mod commands;


use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let today = Local::now().date_naive();

    let context = || commands::load_context(cli.config.as_deref(), cli.ledger.as_deref());

    match cli.command {
        Commands::Add {
            amount,
            category,
            date,
            description,
        } => commands::cmd_add(
            &context()?,
            amount,
            &category,
            date.as_deref(),
            &description,
            today,
        ),
        Commands::List { limit } => commands::cmd_list(&context()?, limit),
        Commands::Categories => commands::cmd_categories(&context()?),
        Commands::Insights { days } => commands::cmd_insights(&context()?, days, today),
        Commands::Budget { amount } => commands::cmd_budget(&context()?, amount, today),
        Commands::Summary => {
            let ctx = context()?;
            let assistant = commands::build_assistant(&ctx.config)?;
            commands::cmd_summary(&ctx, &assistant, today).await
        }
        Commands::Ask { question } => {
            let ctx = context()?;
            let assistant = commands::build_assistant(&ctx.config)?;
            commands::cmd_ask(&ctx, &assistant, &question.join(" "), today).await
        }
        Commands::Prompts { action } => match action {
            PromptsAction::List => commands::cmd_prompts_list(),
            PromptsAction::Show { id } => commands::cmd_prompts_show(&id),
            PromptsAction::Path => commands::cmd_prompts_path(),
        },
        Commands::Config => commands::cmd_config(&context()?),
    }
}
