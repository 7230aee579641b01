//! CSV-backed expense store
//!
//! The ledger lives in a single CSV file with a `Date,Category,Amount,Description`
//! header. It is read once at startup and rewritten in full after every append.
//! Rewrites go through a temp file in the same directory followed by a rename,
//! so a crash mid-write leaves the previous file intact.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{parse_date, Category, ExpenseLedger, ExpenseRecord, NewExpense};

/// Canonical column order of the ledger file
pub const LEDGER_COLUMNS: [&str; 4] = ["Date", "Category", "Amount", "Description"];

/// Expense store bound to one ledger file
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    path: PathBuf,
}

impl ExpenseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger, treating a missing file as an empty ledger
    ///
    /// Malformed content is an error; only "not found" is recovered.
    pub fn load(&self) -> Result<ExpenseLedger> {
        match self.read() {
            Ok(ledger) => Ok(ledger),
            Err(Error::StorageNotFound(path)) => {
                debug!(path = %path.display(), "No ledger file yet, starting empty");
                Ok(ExpenseLedger::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Read the ledger without recovering from a missing file
    pub fn read(&self) -> Result<ExpenseLedger> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::StorageNotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let ledger = parse_ledger(file, &self.path)?;
        debug!(
            path = %self.path.display(),
            records = ledger.len(),
            "Loaded ledger"
        );
        Ok(ledger)
    }

    /// Append a new expense and persist the full ledger
    ///
    /// Returns the ledger with the normalized record at the end. The file is
    /// only replaced once the new content has been written completely.
    pub fn append(&self, ledger: ExpenseLedger, expense: &NewExpense) -> Result<ExpenseLedger> {
        let record = expense.normalize()?;
        let ledger = ledger.with_record(record);
        self.save(&ledger)?;

        if let Some(record) = ledger.last() {
            info!(
                date = %record.date,
                category = %record.category,
                amount = record.amount,
                "Expense added"
            );
        }
        Ok(ledger)
    }

    /// Rewrite the ledger file with the given records
    pub fn save(&self, ledger: &ExpenseLedger) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        write_ledger(temp.as_file_mut(), ledger)?;
        temp.as_file_mut().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!(
            path = %self.path.display(),
            records = ledger.len(),
            "Persisted ledger"
        );
        Ok(())
    }
}

/// Parse ledger CSV content
///
/// `path` is only used for error messages.
pub fn parse_ledger<R: Read>(reader: R, path: &Path) -> Result<ExpenseLedger> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let malformed = |line: u64, reason: String| Error::StorageMalformed {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let headers = rdr.headers().map_err(|e| malformed(1, e.to_string()))?.clone();
    // An empty file has no header row at all; treat it as an empty ledger
    if headers.is_empty() {
        return Ok(ExpenseLedger::new());
    }
    let columns = column_indices(&headers).map_err(|reason| malformed(1, reason))?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            malformed(line, e.to_string())
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let record = parse_row(&row, &columns).map_err(|reason| malformed(line, reason))?;
        records.push(record);
    }

    Ok(ExpenseLedger::from_records(records))
}

/// Positions of the canonical columns within the header
struct Columns {
    date: usize,
    category: usize,
    amount: usize,
    description: usize,
}

fn column_indices(headers: &StringRecord) -> std::result::Result<Columns, String> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("missing '{}' column", name))
    };

    Ok(Columns {
        date: find("Date")?,
        category: find("Category")?,
        amount: find("Amount")?,
        description: find("Description")?,
    })
}

fn parse_row(row: &StringRecord, columns: &Columns) -> std::result::Result<ExpenseRecord, String> {
    let field = |idx: usize, name: &str| {
        row.get(idx)
            .ok_or_else(|| format!("missing {} field", name.to_lowercase()))
    };

    let date = parse_date(field(columns.date, "Date")?).map_err(|e| e.to_string())?;
    let category: Category = field(columns.category, "Category")?
        .parse()
        .map_err(|e: Error| e.to_string())?;
    let amount_str = field(columns.amount, "Amount")?.trim();
    let amount: f64 = amount_str
        .parse()
        .map_err(|_| format!("invalid amount '{}'", amount_str))?;
    let description = field(columns.description, "Description")?.to_string();

    ExpenseRecord::new(date, category, amount, description).map_err(|e| e.to_string())
}

/// Write the ledger as CSV with the canonical header
pub fn write_ledger<W: Write>(writer: W, ledger: &ExpenseLedger) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(LEDGER_COLUMNS)?;

    for record in ledger {
        wtr.write_record([
            record.date.format("%Y-%m-%d").to_string(),
            record.category.to_string(),
            record.amount.to_string(),
            record.description.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_in(dir: &TempDir) -> ExpenseStore {
        ExpenseStore::new(dir.path().join("expenses.csv"))
    }

    #[test]
    fn test_load_missing_returns_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let ledger = store.load().unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(matches!(store.read(), Err(Error::StorageNotFound(_))));
    }

    #[test]
    fn test_append_persists_full_ledger() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let ledger = store.load().unwrap();
        let ledger = store
            .append(ledger, &NewExpense::new(date(2024, 5, 1), "Food", 100.0, "Dinner"))
            .unwrap();
        let ledger = store
            .append(ledger, &NewExpense::new(date(2024, 5, 3), "Transport", 50.0, "Bus"))
            .unwrap();
        assert_eq!(ledger.len(), 2);

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("Date,Category,Amount,Description\n"));
        assert!(content.contains("2024-05-01,Food,100,Dinner"));
        assert!(content.contains("2024-05-03,Transport,50,Bus"));

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, ledger);
    }

    #[test]
    fn test_append_rejects_invalid_input_without_writing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let result = store.append(
            ExpenseLedger::new(),
            &NewExpense::new(date(2024, 5, 1), "Food", -5.0, ""),
        );
        assert!(result.is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_append_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = ExpenseStore::new(dir.path().join("nested").join("expenses.csv"));

        store
            .append(
                ExpenseLedger::new(),
                &NewExpense::new(date(2024, 5, 1), "Bills", 20.0, "Phone"),
            )
            .unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_description_with_commas_and_quotes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let ledger = store
            .append(
                ExpenseLedger::new(),
                &NewExpense::new(date(2024, 5, 1), "Food", 9.99, "Pizza, \"large\""),
            )
            .unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, ledger);
        assert_eq!(reloaded.records()[0].description, "Pizza, \"large\"");
    }

    #[test]
    fn test_parse_pandas_style_file() {
        let csv = "Date,Category,Amount,Description\n\
                   2024-05-01,Food,100.0,Lunch\n\
                   2024-05-03 00:00:00,Transport,50.0,\n\
                   2024-05-10,Pet Care,30.5,Vet\n";
        let ledger = parse_ledger(csv.as_bytes(), Path::new("expenses.csv")).unwrap();

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.records()[1].date, date(2024, 5, 3));
        assert_eq!(ledger.records()[1].description, "");
        assert_eq!(ledger.records()[2].category, Category::Custom("Pet Care".into()));
    }

    #[test]
    fn test_parse_header_only() {
        let ledger =
            parse_ledger("Date,Category,Amount,Description\n".as_bytes(), Path::new("x")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_parse_empty_file() {
        let ledger = parse_ledger("".as_bytes(), Path::new("x")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_malformed_amount_reports_line() {
        let csv = "Date,Category,Amount,Description\n\
                   2024-05-01,Food,100,Lunch\n\
                   2024-05-02,Food,abc,Dinner\n";
        let err = parse_ledger(csv.as_bytes(), Path::new("expenses.csv")).unwrap_err();

        match err {
            Error::StorageMalformed { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("abc"));
            }
            other => panic!("Expected StorageMalformed, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_date_and_missing_column() {
        let bad_date = "Date,Category,Amount,Description\nyesterday,Food,1,x\n";
        assert!(matches!(
            parse_ledger(bad_date.as_bytes(), Path::new("x")),
            Err(Error::StorageMalformed { .. })
        ));

        let missing_col = "Date,Category,Description\n2024-05-01,Food,x\n";
        assert!(matches!(
            parse_ledger(missing_col.as_bytes(), Path::new("x")),
            Err(Error::StorageMalformed { line: 1, .. })
        ));
    }

    #[test]
    fn test_malformed_file_propagates_from_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            "Date,Category,Amount,Description\n2024-05-01,Food,-4,Refund\n",
        )
        .unwrap();

        assert!(matches!(store.load(), Err(Error::StorageMalformed { .. })));
    }
}
