//! Domain models for Pennywise

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Expense category
///
/// The named variants are the categories offered when adding an expense.
/// Anything else the user types is kept as `Custom` instead of being rejected.
///
/// Variant order is the fixed category order used for display and for
/// breaking ties between equal totals: suggested categories first, then
/// custom ones alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Food,
    Transport,
    Groceries,
    Entertainment,
    Bills,
    Other,
    Custom(String),
}

impl Category {
    /// Categories offered to the user
    pub fn suggested() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Groceries,
            Self::Entertainment,
            Self::Bills,
            Self::Other,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Groceries => "Groceries",
            Self::Entertainment => "Entertainment",
            Self::Bills => "Bills",
            Self::Other => "Other",
            Self::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidData("Category must not be empty".into()));
        }

        let category = match trimmed.to_lowercase().as_str() {
            "food" => Self::Food,
            "transport" => Self::Transport,
            "groceries" => Self::Groceries,
            "entertainment" => Self::Entertainment,
            "bills" => Self::Bills,
            "other" => Self::Other,
            _ => Self::Custom(trimmed.to_string()),
        };
        Ok(category)
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub category: Category,
    pub amount: f64,
    pub description: String,
}

impl ExpenseRecord {
    /// Create a record, checking the amount invariant
    pub fn new(
        date: NaiveDate,
        category: Category,
        amount: f64,
        description: impl Into<String>,
    ) -> Result<Self> {
        validate_amount(amount)?;
        Ok(Self {
            date,
            category,
            amount,
            description: description.into(),
        })
    }
}

/// An expense as entered by the user, before normalization
#[derive(Debug, Clone, Default)]
pub struct NewExpense {
    /// `YYYY-MM-DD`, or an ISO datetime whose date part is kept
    pub date: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
}

impl NewExpense {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            category: category.into(),
            amount,
            description: description.into(),
        }
    }

    /// Coerce the raw fields into an `ExpenseRecord`
    pub fn normalize(&self) -> Result<ExpenseRecord> {
        let date = parse_date(&self.date)?;
        let category: Category = self.category.parse()?;
        ExpenseRecord::new(date, category, self.amount, self.description.trim())
    }
}

/// Parse a ledger date
///
/// Accepts plain dates and the datetime shapes other tools write for a
/// date column (`2024-05-01 00:00:00`, `2024-05-01T00:00:00`, RFC 3339).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(datetime.date());
        }
    }
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(datetime.date_naive());
    }

    Err(Error::InvalidData(format!("Invalid date '{}'", s)))
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidData(format!(
            "Amount must be a positive number, got {}",
            amount
        )));
    }
    Ok(())
}

/// The full collection of expense records, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseLedger {
    records: Vec<ExpenseRecord>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ExpenseRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExpenseRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&ExpenseRecord> {
        self.records.last()
    }

    /// Ledger plus one record
    pub fn with_record(mut self, record: ExpenseRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Records newest first; records on the same date keep insertion order
    pub fn sorted_by_date_desc(&self) -> Vec<&ExpenseRecord> {
        let mut sorted: Vec<&ExpenseRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }
}

impl<'a> IntoIterator for &'a ExpenseLedger {
    type Item = &'a ExpenseRecord;
    type IntoIter = std::slice::Iter<'a, ExpenseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<ExpenseRecord> for ExpenseLedger {
    fn from_iter<I: IntoIterator<Item = ExpenseRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// A calendar month in a specific year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!("Invalid month {}", month)));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// English month name ("May")
    pub fn month_name(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B").to_string())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Summed amount per category, iterated in category order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryAggregate {
    totals: BTreeMap<Category, f64>,
}

impl CategoryAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, category: &Category, amount: f64) {
        *self.totals.entry(category.clone()).or_insert(0.0) += amount;
    }

    pub fn get(&self, category: &Category) -> Option<f64> {
        self.totals.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, f64)> {
        self.totals.iter().map(|(c, a)| (c, *a))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    pub fn as_map(&self) -> &BTreeMap<Category, f64> {
        &self.totals
    }
}

/// Whether the month's spending is above the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Over,
    Within,
}

/// Current month's spending against the monthly budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetState {
    pub month: YearMonth,
    pub monthly_budget: f64,
    pub current_month_spend: f64,
    pub status: BudgetStatus,
    /// |spend - budget|: the overspend when over, the remainder when within
    pub delta: f64,
}

impl BudgetState {
    pub fn is_over(&self) -> bool {
        self.status == BudgetStatus::Over
    }
}
