//! Rule-based spending insights
//!
//! Quick observations derived from category totals, no LLM involved:
//! where the most money goes overall, where it went recently, and which
//! category is kept smallest.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::{argmax, argmin, filter_recent, sum_by_category};
use crate::error::Result;
use crate::models::{Category, ExpenseLedger};

/// Default look-back window for the recent-spending insight
pub const DEFAULT_RECENT_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    /// Category with the highest lifetime total
    TopCategory { category: Category, amount: f64 },
    /// Category with the highest total in the recent window
    TopRecentCategory {
        category: Category,
        amount: f64,
        days: u32,
    },
    /// Category with the lowest lifetime total
    LowestCategory { category: Category, amount: f64 },
}

impl Insight {
    pub fn category(&self) -> &Category {
        match self {
            Self::TopCategory { category, .. }
            | Self::TopRecentCategory { category, .. }
            | Self::LowestCategory { category, .. } => category,
        }
    }

    /// Human-readable sentence for this insight
    pub fn message(&self, currency: &str) -> String {
        match self {
            Self::TopCategory { category, amount } => format!(
                "Your highest spending is on {} ({}{:.2}). Consider reviewing that.",
                category, currency, amount
            ),
            Self::TopRecentCategory { category, days, .. } => format!(
                "In the past {} days, you've spent most on {}. Budget accordingly.",
                days, category
            ),
            Self::LowestCategory { category, .. } => {
                format!("You're doing well controlling your {} expenses!", category)
            }
        }
    }
}

/// Generate insights for the ledger
///
/// An empty ledger yields no insights. The recent insight is skipped when
/// nothing was spent in the window.
pub fn generate(ledger: &ExpenseLedger, today: NaiveDate, recent_days: u32) -> Result<Vec<Insight>> {
    if ledger.is_empty() {
        return Ok(Vec::new());
    }

    let sums = sum_by_category(ledger);
    let mut insights = Vec::with_capacity(3);

    let (category, amount) = argmax(&sums)?;
    insights.push(Insight::TopCategory { category, amount });

    let recent = sum_by_category(&filter_recent(ledger, recent_days, today));
    if !recent.is_empty() {
        let (category, amount) = argmax(&recent)?;
        insights.push(Insight::TopRecentCategory {
            category,
            amount,
            days: recent_days,
        });
    }

    let (category, amount) = argmin(&sums)?;
    insights.push(Insight::LowestCategory { category, amount });

    Ok(insights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger() -> ExpenseLedger {
        ExpenseLedger::from_records(vec![
            ExpenseRecord::new(date(2024, 4, 2), Category::Bills, 300.0, "Rent share").unwrap(),
            ExpenseRecord::new(date(2024, 5, 10), Category::Food, 30.0, "").unwrap(),
            ExpenseRecord::new(date(2024, 5, 12), Category::Transport, 45.0, "").unwrap(),
            ExpenseRecord::new(date(2024, 5, 13), Category::Food, 20.0, "").unwrap(),
        ])
    }

    #[test]
    fn test_generate_all_insights() {
        let insights = generate(&ledger(), date(2024, 5, 15), 7).unwrap();
        assert_eq!(
            insights,
            vec![
                Insight::TopCategory {
                    category: Category::Bills,
                    amount: 300.0
                },
                Insight::TopRecentCategory {
                    category: Category::Food,
                    amount: 50.0,
                    days: 7
                },
                Insight::LowestCategory {
                    category: Category::Transport,
                    amount: 45.0
                },
            ]
        );
    }

    #[test]
    fn test_recent_insight_skipped_without_recent_spend() {
        let insights = generate(&ledger(), date(2024, 8, 1), 7).unwrap();
        assert_eq!(insights.len(), 2);
        assert!(!insights
            .iter()
            .any(|i| matches!(i, Insight::TopRecentCategory { .. })));
    }

    #[test]
    fn test_huge_window_covers_whole_ledger() {
        let insights = generate(&ledger(), date(2024, 8, 1), u32::MAX).unwrap();
        assert_eq!(insights.len(), 3);
    }

    #[test]
    fn test_empty_ledger_has_no_insights() {
        let insights = generate(&ExpenseLedger::new(), date(2024, 5, 15), 7).unwrap();
        assert!(insights.is_empty());
    }

    #[test]
    fn test_messages() {
        let insight = Insight::TopCategory {
            category: Category::Food,
            amount: 130.0,
        };
        assert_eq!(
            insight.message("₹"),
            "Your highest spending is on Food (₹130.00). Consider reviewing that."
        );
        assert_eq!(insight.category(), &Category::Food);
    }
}
