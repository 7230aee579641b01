//! Report command implementations

use anyhow::{bail, Result};
use chrono::NaiveDate;
use pennywise_core::aggregate::sum_by_category;
use pennywise_core::{budget, format_amount, insights, Insight, YearMonth};

use super::AppContext;

/// Smallest budget the budget command accepts
pub const MIN_BUDGET: f64 = 100.0;

const BAR_WIDTH: usize = 30;

/// Horizontal bar scaled so `max` fills `width` cells
pub fn bar(amount: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || amount <= 0.0 {
        return String::new();
    }
    let cells = ((amount / max) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

/// Pick the budget from the flag or config and check the minimum
pub fn resolve_budget(amount: Option<f64>, configured: Option<f64>) -> Result<f64> {
    let Some(budget) = amount.or(configured) else {
        bail!("No budget given. Pass --amount or set monthly_budget in the config file");
    };
    if !budget.is_finite() || budget < MIN_BUDGET {
        bail!("Monthly budget must be at least {}, got {}", MIN_BUDGET, budget);
    }
    Ok(budget)
}

/// Spending by category with a text bar chart
pub fn cmd_categories(ctx: &AppContext) -> Result<()> {
    let ledger = ctx.load_ledger()?;
    let currency = &ctx.config.currency;

    if ledger.is_empty() {
        println!("No expenses recorded yet. Add one with `pennywise add`.");
        return Ok(());
    }

    let sums = sum_by_category(&ledger);
    let total = sums.total();
    let max = sums.iter().map(|(_, amount)| amount).fold(0.0, f64::max);

    println!();
    println!("📊 Spending by Category");
    println!("   ─────────────────────────────────────────────────────────────");
    for (category, amount) in sums.iter() {
        println!(
            "   {:15} {:>12} {:>5.1}%  {}",
            category.as_str(),
            format_amount(currency, amount),
            amount / total * 100.0,
            bar(amount, max, BAR_WIDTH)
        );
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {:15} {:>12}", "Total", format_amount(currency, total));

    Ok(())
}

/// Highest, recent and lowest category insights
pub fn cmd_insights(ctx: &AppContext, days: Option<u32>, today: NaiveDate) -> Result<()> {
    let ledger = ctx.load_ledger()?;

    if ledger.is_empty() {
        println!("Add some expenses to see insights.");
        return Ok(());
    }

    let days = days.unwrap_or(ctx.config.recent_days);
    let found = insights::generate(&ledger, today, days)?;

    println!();
    println!("💡 Quick Insights");
    println!();
    for insight in &found {
        let icon = match insight {
            Insight::TopCategory { .. } => "🔍",
            Insight::TopRecentCategory { .. } => "📅",
            Insight::LowestCategory { .. } => "✅",
        };
        println!("   {} {}", icon, insight.message(&ctx.config.currency));
    }

    Ok(())
}

/// This month's spending against a budget
pub fn cmd_budget(ctx: &AppContext, amount: Option<f64>, today: NaiveDate) -> Result<()> {
    let monthly_budget = resolve_budget(amount, ctx.config.monthly_budget)?;
    let ledger = ctx.load_ledger()?;
    let currency = &ctx.config.currency;

    if ledger.is_empty() {
        println!("No expenses recorded yet. Add one with `pennywise add`.");
        return Ok(());
    }

    let state = budget::evaluate(&ledger, monthly_budget, today);

    println!();
    println!("💰 Budget for {}", YearMonth::of(today));
    println!("   Budget:  {}", format_amount(currency, state.monthly_budget));
    println!("   Spent:   {}", format_amount(currency, state.current_month_spend));
    println!();
    if state.is_over() {
        println!(
            "   ⚠️  You've exceeded your budget by {}",
            format_amount(currency, state.delta)
        );
    } else {
        println!(
            "   ✅ You're within budget. Remaining: {}",
            format_amount(currency, state.delta)
        );
    }

    Ok(())
}
