use chrono::{Datelike, Days, NaiveDate};

use super::{CategoryLabel, Cents, ExpenseRecord};

/// Sum amounts of records whose date text equals `day` exactly.
/// No date parsing happens here, so malformed stored dates never match
/// and never fail.
pub fn total_for_day(day: &str, records: &[ExpenseRecord]) -> Result<Cents, TotalError> {
    records
        .iter()
        .filter(|r| r.date == day)
        .try_fold(0, |total: Cents, record| add_amount(total, record))
}

/// Sum amounts of records dated within `[start, start + 7 days)`.
///
/// Every stored date is parsed; the first one that does not parse fails
/// the whole computation.
pub fn total_for_week(start: NaiveDate, records: &[ExpenseRecord]) -> Result<Cents, TotalError> {
    // None only at the very end of the calendar; the window is then open-ended
    let end = start.checked_add_days(Days::new(7));

    records
        .iter()
        .enumerate()
        .try_fold(0, |total: Cents, (index, record)| -> Result<Cents, TotalError> {
            let date = stored_date(index, record)?;
            if date >= start && end.is_none_or(|end| date < end) {
                add_amount(total, record)
            } else {
                Ok(total)
            }
        })
}

/// Sum amounts of records dated in the given calendar month.
/// Fails on the first stored date that does not parse.
pub fn total_for_month(
    month: u32,
    year: i32,
    records: &[ExpenseRecord],
) -> Result<Cents, TotalError> {
    records
        .iter()
        .enumerate()
        .try_fold(0, |total: Cents, (index, record)| -> Result<Cents, TotalError> {
            let date = stored_date(index, record)?;
            if date.month() == month && date.year() == year {
                add_amount(total, record)
            } else {
                Ok(total)
            }
        })
}

/// Add one amount to a running total, failing instead of wrapping.
pub fn checked_total(total: Cents, amount_cents: Cents) -> Result<Cents, TotalError> {
    total.checked_add(amount_cents).ok_or(TotalError::Overflow)
}

fn add_amount(total: Cents, record: &ExpenseRecord) -> Result<Cents, TotalError> {
    checked_total(total, record.amount_cents)
}

/// Records filed under `category`, compared case-sensitively, each paired
/// with its position in `records`.
pub fn filter_by_category<'a>(
    category: &str,
    records: &'a [ExpenseRecord],
) -> Vec<(usize, &'a ExpenseRecord)> {
    let label = CategoryLabel::new(category);
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| label.matches(r))
        .collect()
}

fn stored_date(index: usize, record: &ExpenseRecord) -> Result<NaiveDate, TotalError> {
    record.parsed_date().ok_or_else(|| TotalError::MalformedDate {
        index,
        date: record.date.clone(),
    })
}

/// Why a total over stored records could not be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotalError {
    /// A record already in the ledger carries a date that does not parse
    MalformedDate { index: usize, date: String },
    /// The sum does not fit in `Cents`
    Overflow,
}

impl std::fmt::Display for TotalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TotalError::MalformedDate { index, date } => write!(
                f,
                "Expense #{} has malformed date '{}' (expected YYYY-MM-DD)",
                index, date
            ),
            TotalError::Overflow => write!(f, "Total is too large to represent"),
        }
    }
}

impl std::error::Error for TotalError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount_cents: Cents, date: &str, category: &str) -> ExpenseRecord {
        ExpenseRecord::new(amount_cents, date, category, "")
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_total_for_day_empty() {
        assert_eq!(total_for_day("2024-11-01", &[]), Ok(0));
    }

    #[test]
    fn test_total_for_day_sums_matching_dates() {
        let records = vec![
            record(5000, "2024-11-01", "Groceries"),
            record(3000, "2024-11-01", "Dining"),
            record(2000, "2024-11-02", "Utilities"),
        ];
        assert_eq!(total_for_day("2024-11-01", &records), Ok(8000));
    }

    #[test]
    fn test_total_for_day_is_textual() {
        // Same calendar day, different spelling: not a match
        let records = vec![record(5000, "2024-11-1", "Groceries")];
        assert_eq!(total_for_day("2024-11-01", &records), Ok(0));
    }

    #[test]
    fn test_total_for_week_half_open_window() {
        let records = vec![
            record(5000, "2024-11-01", "Groceries"),
            record(1000, "2024-11-07", "Groceries"),
            record(9900, "2024-11-08", "Groceries"),
            record(700, "2024-10-31", "Groceries"),
        ];
        assert_eq!(total_for_week(ymd(2024, 11, 1), &records), Ok(6000));
    }

    #[test]
    fn test_total_for_week_crosses_month_boundary() {
        let records = vec![
            record(100, "2024-12-30", "A"),
            record(200, "2025-01-05", "A"),
            record(400, "2025-01-06", "A"),
        ];
        assert_eq!(total_for_week(ymd(2024, 12, 30), &records), Ok(300));
    }

    #[test]
    fn test_total_for_week_fails_on_malformed_stored_date() {
        let records = vec![record(100, "2024-11-01", "A"), record(200, "garbage", "A")];
        assert_eq!(
            total_for_week(ymd(2024, 11, 1), &records),
            Err(TotalError::MalformedDate {
                index: 1,
                date: "garbage".into()
            })
        );
    }

    #[test]
    fn test_total_for_month() {
        let records = vec![
            record(5000, "2024-11-01", "A"),
            record(2000, "2024-11-30", "B"),
            record(1500, "2024-12-01", "A"),
            record(900, "2023-11-15", "A"),
        ];
        assert_eq!(total_for_month(11, 2024, &records), Ok(7000));
        assert_eq!(total_for_month(1, 2024, &records), Ok(0));
    }

    #[test]
    fn test_total_for_month_fails_on_malformed_stored_date() {
        let records = vec![record(100, "11/01/2024", "A")];
        assert_eq!(
            total_for_month(11, 2024, &records),
            Err(TotalError::MalformedDate {
                index: 0,
                date: "11/01/2024".into()
            })
        );
    }

    #[test]
    fn test_totals_fail_instead_of_wrapping() {
        let records = vec![
            record(Cents::MAX, "2024-11-01", "A"),
            record(1, "2024-11-01", "A"),
        ];
        assert_eq!(total_for_day("2024-11-01", &records), Err(TotalError::Overflow));
        assert_eq!(
            total_for_week(ymd(2024, 11, 1), &records),
            Err(TotalError::Overflow)
        );
        assert_eq!(total_for_month(11, 2024, &records), Err(TotalError::Overflow));
        // Out-of-window amounts are never added
        assert_eq!(total_for_month(12, 2024, &records), Ok(0));
    }

    #[test]
    fn test_filter_by_category_is_case_sensitive() {
        let records = vec![
            record(100, "2024-11-01", "Bills"),
            record(200, "2024-11-02", "bills"),
            record(300, "2024-11-03", "Bills"),
        ];
        let filtered = filter_by_category("Bills", &records);
        let positions: Vec<usize> = filtered.iter().map(|(index, _)| *index).collect();
        assert_eq!(positions, vec![0, 2]);
        assert_eq!(filtered[1].1.amount_cents, 300);
    }
}
