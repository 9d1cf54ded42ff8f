// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use impensa::ExpenseLedger;
use impensa::domain::ExpenseRecord;
use tempfile::TempDir;

/// Helper to get a ledger file path inside a fresh temporary directory.
/// The file itself is not created.
pub fn test_file() -> Result<(PathBuf, TempDir)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("expenses.csv");
    Ok((path, temp_dir))
}

/// Helper to write raw CSV text to a fresh ledger file.
pub fn write_csv(contents: &str) -> Result<(PathBuf, TempDir)> {
    let (path, temp_dir) = test_file()?;
    std::fs::write(&path, contents)?;
    Ok((path, temp_dir))
}

/// Helper to build a record from whole currency units.
pub fn expense(units: i64, date: &str, category: &str, description: &str) -> ExpenseRecord {
    ExpenseRecord::new(units * 100, date, category, description)
}

/// Test fixture: the two expenses used throughout the docs.
pub fn sample_ledger() -> Result<ExpenseLedger> {
    let mut ledger = ExpenseLedger::new();
    ledger.add(expense(50, "2024-11-01", "Groceries", "Bought groceries"))?;
    ledger.add(expense(20, "2024-11-02", "Utilities", "Paid electricity bill"))?;
    Ok(ledger)
}
