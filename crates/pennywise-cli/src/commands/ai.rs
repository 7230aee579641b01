//! AI command implementations
//!
//! A failed LLM call prints an inline failure line and the command still
//! succeeds. Ledger and prompt errors are real errors.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pennywise_core::{
    build_chat_prompt, build_monthly_summary_prompt, Assistant, LlmError, PromptLibrary, TaskType,
    YearMonth,
};

use super::AppContext;

fn print_failure(what: &str, err: &LlmError) {
    println!("❌ {} failed: {}", what, err);
    if matches!(err, LlmError::NotConfigured(_)) {
        println!("   Set the API key environment variable named by llm.api_key_env (default GEMINI_API_KEY).");
    }
}

/// AI spending summary, labelled with the current month
pub async fn cmd_summary(ctx: &AppContext, assistant: &Assistant, today: NaiveDate) -> Result<()> {
    let ledger = ctx.load_ledger()?;

    if ledger.is_empty() {
        println!("Add some expenses before asking for a summary.");
        return Ok(());
    }

    let mut prompts = PromptLibrary::new();
    let prompt = build_monthly_summary_prompt(&mut prompts, &ledger, today, &ctx.config.currency)
        .context("Failed to build summary prompt")?;

    println!("🧠 Generating summary for {}...", YearMonth::of(today));
    println!();

    match assistant.summarize(TaskType::MonthlySummary, &prompt).await {
        Ok(summary) => println!("{}", summary),
        Err(e) => print_failure("AI summary", &e),
    }

    Ok(())
}

/// Ask the assistant a free-form question about the ledger
pub async fn cmd_ask(
    ctx: &AppContext,
    assistant: &Assistant,
    question: &str,
    today: NaiveDate,
) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        println!("Ask a question, e.g. pennywise ask \"Where can I cut back?\"");
        return Ok(());
    }

    let ledger = ctx.load_ledger()?;

    let mut prompts = PromptLibrary::new();
    let prompt = build_chat_prompt(&mut prompts, question, &ledger, today, &ctx.config.currency)
        .context("Failed to build chat prompt")?;

    match assistant.summarize(TaskType::Chat, &prompt).await {
        Ok(answer) => {
            println!("🤖 {}", answer);
        }
        Err(e) => print_failure("AI chat", &e),
    }

    Ok(())
}
