//! Ledger file location.
//!
//! The path is resolved once at startup and then handed explicitly to
//! `ExpenseLedger::load` and `ExpenseLedger::save`.
//!
//! ## Resolution order
//!
//! 1. `--file <PATH>` (or the `IMPENSA_FILE` environment variable)
//! 2. `data/expenses.csv` in the directory above the executable

use std::path::{Path, PathBuf};

use tracing::warn;

/// Environment variable consulted when `--file` is not given.
pub const FILE_ENV_VAR: &str = "IMPENSA_FILE";

/// Location of the ledger file relative to the executable's directory.
pub const DEFAULT_RELATIVE_PATH: &str = "../data/expenses.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub data_file: PathBuf,
}

impl LedgerConfig {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
        }
    }

    /// Use `explicit` when given, otherwise the default next to the executable.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        match explicit {
            Some(path) => Self::new(path),
            None => Self::new(default_data_file()),
        }
    }
}

/// `<exe dir>/../data/expenses.csv`, falling back to the working directory
/// when the executable path cannot be determined.
pub fn default_data_file() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => data_file_beside(&exe),
        Err(e) => {
            warn!(error = %e, "cannot locate executable, using working directory");
            PathBuf::from(DEFAULT_RELATIVE_PATH)
        }
    }
}

fn data_file_beside(exe: &Path) -> PathBuf {
    exe.parent()
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_RELATIVE_PATH)
}
