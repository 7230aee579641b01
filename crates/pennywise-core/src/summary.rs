//! Prompt builders that turn ledger aggregates into LLM requests
//!
//! Both builders are pure: they read the ledger, render a template and return
//! the text. Sending it is the adapter's job.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::aggregate::{spend_on, sum_by_category, total};
use crate::error::Result;
use crate::models::{CategoryAggregate, ExpenseLedger, YearMonth};
use crate::prompts::{PromptId, PromptLibrary};

/// Build the summary prompt labelled with the month containing `today`
///
/// The total and category sums cover the whole ledger, not just that month.
pub fn build_monthly_summary_prompt(
    library: &mut PromptLibrary,
    ledger: &ExpenseLedger,
    today: NaiveDate,
    currency: &str,
) -> Result<String> {
    let month = YearMonth::of(today);

    let month_name = format!("{} {}", month.month_name(), month.year);
    let total = format_amount(currency, total(ledger));
    let categories = format_categories(&sum_by_category(ledger), currency);

    let mut vars = HashMap::new();
    vars.insert("month", month_name.as_str());
    vars.insert("total", total.as_str());
    vars.insert("categories", categories.as_str());

    let prompt = library.get(PromptId::MonthlySummary)?.render_user(&vars);
    debug!(month = %month, records = ledger.len(), "Built monthly summary prompt");
    Ok(prompt)
}

/// Build the chat prompt for a user question
///
/// Context is today's spend (exact date match), the lifetime total and the
/// lifetime category totals. The question is embedded verbatim.
pub fn build_chat_prompt(
    library: &mut PromptLibrary,
    question: &str,
    ledger: &ExpenseLedger,
    today: NaiveDate,
    currency: &str,
) -> Result<String> {
    let today_str = today.format("%Y-%m-%d").to_string();
    let today_total = format_amount(currency, spend_on(ledger, today));
    let total = format_amount(currency, total(ledger));
    let categories = format_categories(&sum_by_category(ledger), currency);

    let mut vars = HashMap::new();
    vars.insert("today", today_str.as_str());
    vars.insert("today_total", today_total.as_str());
    vars.insert("total", total.as_str());
    vars.insert("categories", categories.as_str());
    vars.insert("question", question);

    let prompt = library.get(PromptId::ExpenseChat)?.render_user(&vars);
    debug!(records = ledger.len(), "Built chat prompt");
    Ok(prompt)
}

pub fn format_amount(currency: &str, amount: f64) -> String {
    format!("{}{:.2}", currency, amount)
}

/// One "- Category: amount" line per category, in category order
fn format_categories(aggregate: &CategoryAggregate, currency: &str) -> String {
    if aggregate.is_empty() {
        return "- (no expenses recorded)".to_string();
    }

    aggregate
        .iter()
        .map(|(category, amount)| format!("- {}: {}", category, format_amount(currency, amount)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ExpenseRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger() -> ExpenseLedger {
        ExpenseLedger::from_records(vec![
            ExpenseRecord::new(date(2024, 4, 28), Category::Bills, 999.0, "April rent").unwrap(),
            ExpenseRecord::new(date(2024, 5, 1), Category::Food, 100.0, "").unwrap(),
            ExpenseRecord::new(date(2024, 5, 3), Category::Transport, 50.0, "").unwrap(),
            ExpenseRecord::new(date(2024, 5, 15), Category::Food, 30.0, "").unwrap(),
        ])
    }

    #[test]
    fn test_monthly_summary_prompt() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt =
            build_monthly_summary_prompt(&mut lib, &ledger(), date(2024, 5, 20), "₹").unwrap();

        assert!(prompt.contains("spending for May 2024"));
        assert!(prompt.contains("Total expenses: ₹1179.00"));
        assert!(prompt.contains("- Food: ₹130.00\n- Transport: ₹50.00\n- Bills: ₹999.00"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_monthly_summary_prompt_counts_earlier_months() {
        let ledger = ExpenseLedger::from_records(vec![
            ExpenseRecord::new(date(2024, 4, 28), Category::Bills, 999.0, "").unwrap(),
            ExpenseRecord::new(date(2024, 5, 1), Category::Food, 100.0, "").unwrap(),
        ]);
        let mut lib = PromptLibrary::embedded_only();
        let prompt =
            build_monthly_summary_prompt(&mut lib, &ledger, date(2024, 5, 20), "₹").unwrap();

        assert!(prompt.contains("spending for May 2024"));
        assert!(prompt.contains("Total expenses: ₹1099.00"));
        assert!(prompt.contains("- Bills: ₹999.00"));
    }

    #[test]
    fn test_monthly_summary_prompt_empty_ledger() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt = build_monthly_summary_prompt(
            &mut lib,
            &ExpenseLedger::new(),
            date(2024, 7, 1),
            "$",
        )
        .unwrap();

        assert!(prompt.contains("July 2024"));
        assert!(prompt.contains("Total expenses: $0.00"));
        assert!(prompt.contains("(no expenses recorded)"));
    }

    #[test]
    fn test_chat_prompt() {
        let mut lib = PromptLibrary::embedded_only();
        let question = "Where can I cut back? {{total}}";
        let prompt =
            build_chat_prompt(&mut lib, question, &ledger(), date(2024, 5, 15), "₹").unwrap();

        assert!(prompt.contains("Total spent today (2024-05-15): ₹30.00"));
        assert!(prompt.contains("Total expenses so far: ₹1179.00"));
        assert!(prompt.contains("- Food: ₹130.00\n- Transport: ₹50.00\n- Bills: ₹999.00"));
        assert!(prompt.ends_with(question));
    }

    #[test]
    fn test_chat_prompt_nothing_today() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt = build_chat_prompt(&mut lib, "hi", &ledger(), date(2024, 5, 16), "₹").unwrap();
        assert!(prompt.contains("Total spent today (2024-05-16): ₹0.00"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("₹", 12.5), "₹12.50");
        assert_eq!(format_amount("", 3.0), "3.00");
    }
}
