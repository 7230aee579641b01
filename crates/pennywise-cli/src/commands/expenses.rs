//! Expense command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pennywise_core::{format_amount, NewExpense};

use super::{truncate, AppContext};

/// Record a new expense and persist the ledger
pub fn cmd_add(
    ctx: &AppContext,
    amount: f64,
    category: &str,
    date: Option<&str>,
    description: &str,
    today: NaiveDate,
) -> Result<()> {
    let expense = NewExpense {
        date: date
            .map(str::to_string)
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        category: category.to_string(),
        amount,
        description: description.to_string(),
    };

    let ledger = ctx.load_ledger()?;
    let ledger = ctx
        .store
        .append(ledger, &expense)
        .context("Failed to add expense")?;

    if let Some(record) = ledger.last() {
        println!(
            "✅ Expense added: {} on {} ({})",
            format_amount(&ctx.config.currency, record.amount),
            record.date,
            record.category
        );
        if record.category.is_custom() {
            println!("   Note: '{}' is a custom category", record.category);
        }
    }

    Ok(())
}

/// List expenses, newest first
pub fn cmd_list(ctx: &AppContext, limit: usize) -> Result<()> {
    let ledger = ctx.load_ledger()?;

    if ledger.is_empty() {
        println!("No expenses recorded yet. Add one with `pennywise add`.");
        return Ok(());
    }

    println!();
    println!("📒 Expenses ({} total)", ledger.len());
    println!();
    println!(
        "   {:10} │ {:15} │ {:>12} │ Description",
        "Date", "Category", "Amount"
    );
    println!("   ───────────┼─────────────────┼──────────────┼────────────────────────────");

    for record in ledger.sorted_by_date_desc().into_iter().take(limit) {
        println!(
            "   {:10} │ {:15} │ {:>12} │ {}",
            record.date.format("%Y-%m-%d"),
            truncate(record.category.as_str(), 15),
            format_amount(&ctx.config.currency, record.amount),
            truncate(&record.description, 40)
        );
    }

    if ledger.len() > limit {
        println!();
        println!("   ... and {} older (use --limit to show more)", ledger.len() - limit);
    }

    Ok(())
}
