use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::LedgerError;
use crate::domain::{ExpenseRecord, format_cents, parse_cents};

/// Column order of the ledger file.
pub const HEADER: [&str; 4] = ["Amount", "Date", "Category", "Description"];

/// Rows read back from a ledger file.
#[derive(Debug, Clone, Default)]
pub struct CsvContents {
    pub records: Vec<ExpenseRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// A data row that was left out while reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based row number, the header being row 1
    pub row: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The row did not have exactly four fields
    FieldCount(usize),
    /// The amount did not parse or was not positive
    InvalidAmount(String),
}

impl std::fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            SkipReason::FieldCount(n) => {
                write!(f, "Row {}: expected 4 fields, found {}", self.row, n)
            }
            SkipReason::InvalidAmount(raw) => {
                write!(f, "Row {}: invalid amount '{}'", self.row, raw)
            }
        }
    }
}

/// The flat CSV file a ledger is persisted to.
/// The file is opened and closed around each read or write.
#[derive(Debug, Clone)]
pub struct CsvFile {
    path: PathBuf,
}

impl CsvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all rows. Returns `Ok(None)` when the file does not exist.
    pub fn read(&self) -> Result<Option<CsvContents>, LedgerError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LedgerError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let contents = read_expenses(file).map_err(|e| self.wrap(e))?;
        debug!(
            path = %self.path.display(),
            records = contents.records.len(),
            skipped = contents.skipped.len(),
            "read ledger file"
        );
        Ok(Some(contents))
    }

    /// Replace the file with the header followed by `records`.
    /// Returns the number of rows written.
    pub fn write(&self, records: &[ExpenseRecord]) -> Result<usize, LedgerError> {
        let file = File::create(&self.path).map_err(|source| LedgerError::Io {
            path: self.path.clone(),
            source,
        })?;

        let written = write_expenses(file, records).map_err(|e| self.wrap(ReadError::Csv(e)))?;
        debug!(path = %self.path.display(), records = written, "wrote ledger file");
        Ok(written)
    }

    fn wrap(&self, err: ReadError) -> LedgerError {
        match err {
            ReadError::Header(found) => LedgerError::HeaderMismatch { found },
            ReadError::Csv(source) => LedgerError::Csv {
                path: self.path.clone(),
                source,
            },
        }
    }
}

#[derive(Debug)]
pub enum ReadError {
    Header(String),
    Csv(csv::Error),
}

impl From<csv::Error> for ReadError {
    fn from(err: csv::Error) -> Self {
        ReadError::Csv(err)
    }
}

/// Parse ledger rows from any reader.
///
/// The first row must be the header. Data rows with the wrong number of
/// fields, or whose amount is unparseable or not positive, are skipped and
/// reported. Date, category and description are taken verbatim.
pub fn read_expenses<R: Read>(reader: R) -> Result<CsvContents, ReadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut contents = CsvContents::default();
    let mut rows = csv_reader.records();

    match rows.next() {
        None => return Ok(contents),
        Some(header) => check_header(&header?)?,
    }

    for (idx, result) in rows.enumerate() {
        let row = idx + 2;
        let record = result?;

        if record.len() != HEADER.len() {
            contents.skipped.push(SkippedRow {
                row,
                reason: SkipReason::FieldCount(record.len()),
            });
            continue;
        }

        let raw_amount = &record[0];
        let amount_cents = match parse_cents(raw_amount) {
            Ok(cents) if cents > 0 => cents,
            _ => {
                contents.skipped.push(SkippedRow {
                    row,
                    reason: SkipReason::InvalidAmount(raw_amount.to_string()),
                });
                continue;
            }
        };

        contents.records.push(ExpenseRecord::new(
            amount_cents,
            &record[1],
            &record[2],
            &record[3],
        ));
    }

    Ok(contents)
}

fn check_header(header: &csv::StringRecord) -> Result<(), ReadError> {
    let matches = header.len() == HEADER.len()
        && header.iter().zip(HEADER).enumerate().all(|(i, (found, expected))| {
            let found = if i == 0 {
                found.trim_start_matches('\u{feff}')
            } else {
                found
            };
            found.trim().eq_ignore_ascii_case(expected)
        });

    if matches {
        Ok(())
    } else {
        Err(ReadError::Header(header.iter().collect::<Vec<_>>().join(",")))
    }
}

/// Write the header and one row per record. Fields are quoted as needed.
pub fn write_expenses<W: Write>(writer: W, records: &[ExpenseRecord]) -> csv::Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for record in records {
        csv_writer.write_record([
            format_cents(record.amount_cents).as_str(),
            record.date.as_str(),
            record.category.as_str(),
            record.description.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(records.len())
}
