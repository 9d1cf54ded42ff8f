use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{Cents, InvalidField, TotalError, format_cents};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Amount must be a positive number (got {0})")]
    InvalidAmount(String),

    #[error("Date must be in the format YYYY-MM-DD (got '{0}')")]
    InvalidDate(String),

    #[error("Category cannot be empty")]
    EmptyCategory,

    #[error("No expense found at index {index} (ledger has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Expense #{index} has malformed date '{date}' (expected YYYY-MM-DD)")]
    MalformedStoredDate { index: usize, date: String },

    #[error("Total is too large to represent")]
    AmountOverflow,

    #[error("Unexpected CSV header [{found}], expected [Amount,Date,Category,Description]")]
    HeaderMismatch { found: String },

    #[error("Unable to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to process CSV at {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl LedgerError {
    /// True for the kinds raised by field validation on add/update.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount(_) | LedgerError::InvalidDate(_) | LedgerError::EmptyCategory
        )
    }

    /// Build the validation error matching a rejected record field.
    pub(crate) fn from_field(field: InvalidField, amount_cents: Cents, date: &str) -> Self {
        match field {
            InvalidField::Amount => LedgerError::InvalidAmount(format_cents(amount_cents)),
            InvalidField::Date => LedgerError::InvalidDate(date.to_string()),
            InvalidField::Category => LedgerError::EmptyCategory,
        }
    }
}

impl From<TotalError> for LedgerError {
    fn from(err: TotalError) -> Self {
        match err {
            TotalError::MalformedDate { index, date } => {
                LedgerError::MalformedStoredDate { index, date }
            }
            TotalError::Overflow => LedgerError::AmountOverflow,
        }
    }
}
