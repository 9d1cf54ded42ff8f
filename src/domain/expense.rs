use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Cents;

/// Canonical textual date format for records: `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single expense entry.
///
/// The shape itself enforces nothing: malformed records can be built
/// directly. The ledger checks them at its mutation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Amount in cents (positive once accepted by the ledger)
    pub amount_cents: Cents,
    /// Date as written, expected to be `YYYY-MM-DD`
    pub date: String,
    /// Free-form category label, matched by exact string equality
    pub category: String,
    /// Free-form description, may be empty
    pub description: String,
}

impl ExpenseRecord {
    pub fn new(
        amount_cents: Cents,
        date: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            amount_cents,
            date: date.into(),
            category: category.into(),
            description: description.into(),
        }
    }

    /// Parse the stored date, if it is well formed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date).ok()
    }
}

/// A bare category name. Records refer to categories by string, not by
/// this type; it exists so callers can name a category on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryLabel {
    pub name: String,
}

impl CategoryLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// True if the record is filed under this label.
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        record.category == self.name
    }
}

impl std::fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
}

/// Which field of a record failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidField {
    Amount,
    Date,
    Category,
}

pub fn validate_amount(amount_cents: Cents) -> Result<(), InvalidField> {
    if amount_cents > 0 {
        Ok(())
    } else {
        Err(InvalidField::Amount)
    }
}

pub fn validate_date(date: &str) -> Result<(), InvalidField> {
    parse_date(date).map(|_| ()).map_err(|_| InvalidField::Date)
}

pub fn validate_category(category: &str) -> Result<(), InvalidField> {
    if category.is_empty() {
        Err(InvalidField::Category)
    } else {
        Ok(())
    }
}

/// Check every rule a record must satisfy to enter the ledger.
/// Rules are checked in order: amount, date, category.
pub fn validate_record(record: &ExpenseRecord) -> Result<(), InvalidField> {
    validate_amount(record.amount_cents)?;
    validate_date(&record.date)?;
    validate_category(&record.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_record_passes() {
        let record = ExpenseRecord::new(5000, "2024-11-01", "Groceries", "Bought groceries");
        assert_eq!(validate_record(&record), Ok(()));
        assert_eq!(
            record.parsed_date(),
            NaiveDate::from_ymd_opt(2024, 11, 1)
        );
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert_eq!(validate_amount(0), Err(InvalidField::Amount));
        assert_eq!(validate_amount(-1), Err(InvalidField::Amount));
        assert_eq!(validate_amount(1), Ok(()));
    }

    #[test]
    fn test_malformed_dates_rejected() {
        for bad in ["2024/11/01", "01-11-2024", "2024-13-01", "2024-02-30", "", "yesterday"] {
            assert_eq!(validate_date(bad), Err(InvalidField::Date), "{bad}");
        }
    }

    #[test]
    fn test_empty_category_rejected() {
        assert_eq!(validate_category(""), Err(InvalidField::Category));
        assert_eq!(validate_category("Bills"), Ok(()));
    }

    #[test]
    fn test_first_failing_rule_reported() {
        let record = ExpenseRecord::new(0, "nope", "", "");
        assert_eq!(validate_record(&record), Err(InvalidField::Amount));

        let record = ExpenseRecord::new(100, "nope", "", "");
        assert_eq!(validate_record(&record), Err(InvalidField::Date));
    }

    #[test]
    fn test_category_label_matches_by_exact_name() {
        let label = CategoryLabel::new("Bills");
        assert!(label.matches(&ExpenseRecord::new(100, "2024-11-01", "Bills", "")));
        assert!(!label.matches(&ExpenseRecord::new(100, "2024-11-01", "bills", "")));
    }
}
