//! Monthly budget evaluation

use chrono::NaiveDate;

use crate::aggregate::{filter_by_month, total};
use crate::models::{BudgetState, BudgetStatus, ExpenseLedger, YearMonth};

/// Compare this month's spending with the monthly budget
///
/// Spending exactly at the budget counts as within budget.
pub fn evaluate(ledger: &ExpenseLedger, budget: f64, today: NaiveDate) -> BudgetState {
    let month = YearMonth::of(today);
    let spend = total(&filter_by_month(ledger, month));

    let status = if spend > budget {
        BudgetStatus::Over
    } else {
        BudgetStatus::Within
    };

    BudgetState {
        month,
        monthly_budget: budget,
        current_month_spend: spend,
        status,
        delta: (spend - budget).abs(),
    }
}
