//! Group-and-sum helpers over the expense ledger
//!
//! Everything here is a pure function of its inputs. "Today" is always passed
//! in by the caller.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

use crate::error::{Error, Result};
use crate::models::{Category, CategoryAggregate, ExpenseLedger, ExpenseRecord, YearMonth};

/// Sum amounts per category
pub fn sum_by_category<'a, I>(records: I) -> CategoryAggregate
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut aggregate = CategoryAggregate::new();
    for record in records {
        aggregate.add(&record.category, record.amount);
    }
    aggregate
}

/// Sum of all amounts
pub fn total<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records.into_iter().map(|r| r.amount).sum()
}

/// Records dated within the given calendar month
pub fn filter_by_month(ledger: &ExpenseLedger, month: YearMonth) -> ExpenseLedger {
    ledger
        .iter()
        .filter(|r| month.contains(r.date))
        .cloned()
        .collect()
}

/// Records dated on or after `today - days`
///
/// A window reaching past the earliest representable date keeps every record.
pub fn filter_recent(ledger: &ExpenseLedger, days: u32, today: NaiveDate) -> ExpenseLedger {
    let since = today.checked_sub_days(Days::new(days.into()));
    ledger
        .iter()
        .filter(|r| since.map_or(true, |since| r.date >= since))
        .cloned()
        .collect()
}

/// Total spent on exactly `date`
pub fn spend_on(ledger: &ExpenseLedger, date: NaiveDate) -> f64 {
    total(ledger.iter().filter(|r| r.date == date))
}

/// Distinct months that have at least one record, oldest first
pub fn months_present(ledger: &ExpenseLedger) -> Vec<YearMonth> {
    ledger
        .iter()
        .map(|r| YearMonth::of(r.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Category with the highest total
///
/// Ties go to the category that comes first in category order.
pub fn argmax(aggregate: &CategoryAggregate) -> Result<(Category, f64)> {
    pick(aggregate, |candidate, best| candidate > best)
}

/// Category with the lowest total
///
/// Ties go to the category that comes first in category order.
pub fn argmin(aggregate: &CategoryAggregate) -> Result<(Category, f64)> {
    pick(aggregate, |candidate, best| candidate < best)
}

fn pick(aggregate: &CategoryAggregate, better: impl Fn(f64, f64) -> bool) -> Result<(Category, f64)> {
    let mut best: Option<(&Category, f64)> = None;

    // Iteration follows category order, so only a strictly better value
    // replaces the current pick.
    for (category, amount) in aggregate.iter() {
        match best {
            Some((_, best_amount)) if !better(amount, best_amount) => {}
            _ => best = Some((category, amount)),
        }
    }

    best.map(|(category, amount)| (category.clone(), amount))
        .ok_or(Error::EmptyAggregate)
}
