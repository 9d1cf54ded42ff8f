use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use crate::application::{
    CategoryReport, ExpenseLedger, ExpensePatch, LedgerError, LoadOutcome, UpdateOutcome,
};
use crate::config::{FILE_ENV_VAR, LedgerConfig};
use crate::domain::{Cents, DATE_FORMAT, ExpenseRecord, format_cents, parse_cents};
use crate::logging::init_tracing;

/// Impensa - Expense Ledger
#[derive(Parser)]
#[command(name = "impensa")]
#[command(about = "A local-first expense tracker backed by a flat CSV file")]
#[command(version)]
pub struct Cli {
    /// Ledger CSV file (defaults to ../data/expenses.csv next to the executable)
    #[arg(short, long, global = true, env = FILE_ENV_VAR)]
    pub file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger file with just a header row
    Init,

    /// Record a new expense
    Add {
        /// Amount spent (e.g., "50.00" or "50")
        #[arg(allow_negative_numbers = true)]
        amount: String,

        /// Category (e.g., "Groceries", "Utilities")
        #[arg(short, long)]
        category: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Description of the expense
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List all expenses in the order they were recorded
    #[command(visible_alias = "view")]
    List {
        /// Prefix each line with its index
        #[arg(short, long)]
        numbered: bool,
    },

    /// List expenses in a single category (exact, case-sensitive match)
    Filter {
        /// Category name
        category: String,

        /// Prefix each line with its index
        #[arg(short, long)]
        numbered: bool,
    },

    /// Total spent on a given day
    Day {
        /// Day (YYYY-MM-DD)
        day: String,
    },

    /// Total spent over the 7 days starting at a date
    Week {
        /// First day of the week (YYYY-MM-DD)
        start: String,
    },

    /// Total spent in a calendar month
    Month {
        /// Month number (1-12)
        #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,

        /// Year (e.g., 2024)
        year: i32,
    },

    /// Change fields of an existing expense
    Update {
        /// Index of the expense (see `list --numbered`)
        index: usize,

        /// New amount
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Index of the expense (see `list --numbered`)
        index: usize,
    },

    /// Spending breakdown by category
    Report {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        let config = LedgerConfig::resolve(self.file);
        let path = config.data_file.as_path();

        match self.command {
            Commands::Init => run_init_command(path),
            Commands::Add {
                amount,
                category,
                date,
                description,
            } => run_add_command(path, &amount, category, date, description),
            Commands::List { numbered } => run_list_command(path, numbered),
            Commands::Filter { category, numbered } => {
                run_filter_command(path, &category, numbered)
            }
            Commands::Day { day } => run_day_command(path, &day),
            Commands::Week { start } => run_week_command(path, &start),
            Commands::Month { month, year } => run_month_command(path, month, year),
            Commands::Update {
                index,
                amount,
                date,
                category,
                description,
            } => run_update_command(path, index, amount, date, category, description),
            Commands::Delete { index } => run_delete_command(path, index),
            Commands::Report { format } => run_report_command(path, &format),
        }
    }
}

fn run_add_command(
    path: &Path,
    amount: &str,
    category: String,
    date: Option<String>,
    description: String,
) -> Result<()> {
    let mut ledger = open_ledger(path)?;

    let amount_cents = parse_amount(amount)?;
    let date = date.unwrap_or_else(|| Local::now().format(DATE_FORMAT).to_string());

    let record = ExpenseRecord::new(amount_cents, date, category, description);
    let confirmation = format!(
        "Added expense: {} - {} on {} in {}",
        record.description,
        format_cents(record.amount_cents),
        record.date,
        record.category
    );
    ledger.add(record)?;
    println!("{}", confirmation);

    save_ledger(&ledger, path)
}

fn run_list_command(path: &Path, numbered: bool) -> Result<()> {
    let ledger = open_ledger(path)?;

    if ledger.is_empty() {
        println!("No expenses recorded.");
    } else {
        print_expenses(ledger.list_all().iter().enumerate(), numbered);
    }
    Ok(())
}

fn run_filter_command(path: &Path, category: &str, numbered: bool) -> Result<()> {
    let ledger = open_ledger(path)?;

    let matching = ledger.filter_by_category_indexed(category);
    if matching.is_empty() {
        println!("No expenses found for category: {}", category);
    } else {
        println!("Expenses for category '{}':", category);
        print_expenses(matching.into_iter(), numbered);
    }
    Ok(())
}

fn run_day_command(path: &Path, day: &str) -> Result<()> {
    let ledger = open_ledger(path)?;

    let total = ledger.total_for_day(day)?;
    println!("Total expenses for {}: ${}", day, format_cents(total));
    Ok(())
}

fn run_week_command(path: &Path, start: &str) -> Result<()> {
    let ledger = open_ledger(path)?;

    let total = ledger.total_for_week(start)?;
    println!(
        "Total expenses for the week starting {}: ${}",
        start,
        format_cents(total)
    );
    Ok(())
}

fn run_month_command(path: &Path, month: u32, year: i32) -> Result<()> {
    let ledger = open_ledger(path)?;

    let total = ledger.total_for_month(month, year)?;
    println!(
        "Total expenses for {}-{:02}: ${}",
        year,
        month,
        format_cents(total)
    );
    Ok(())
}

fn run_update_command(
    path: &Path,
    index: usize,
    amount: Option<String>,
    date: Option<String>,
    category: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let mut ledger = open_ledger(path)?;

    // An unparseable amount is rejected like any other invalid field
    let (amount_cents, amount_error) = match amount {
        Some(text) => match parse_cents(&text) {
            Ok(cents) => (Some(cents), None),
            Err(_) => (None, Some(LedgerError::InvalidAmount(text))),
        },
        None => (None, None),
    };

    let patch = ExpensePatch {
        amount_cents,
        date,
        category,
        description,
    };

    let mut outcome = ledger.update(index, patch)?;
    if let Some(err) = amount_error {
        outcome.rejected.insert(0, err);
    }
    print_update(&outcome);

    save_ledger(&ledger, path)
}

fn run_delete_command(path: &Path, index: usize) -> Result<()> {
    let mut ledger = open_ledger(path)?;

    let removed = ledger.delete(index)?;
    println!("Deleted expense: {}", removed.description);

    save_ledger(&ledger, path)
}

fn run_report_command(path: &Path, format: &str) -> Result<()> {
    let ledger = open_ledger(path)?;

    let report = ledger.category_report()?;
    print_report(&report, format)
}

fn run_init_command(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Ledger already exists: {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    ExpenseLedger::new().save(path)?;
    println!("Ledger initialized: {}", path.display());
    Ok(())
}

/// Load the ledger at `path`, reporting a missing file or skipped rows.
fn open_ledger(path: &Path) -> Result<ExpenseLedger> {
    let mut ledger = ExpenseLedger::new();
    let outcome = ledger
        .load(path)
        .with_context(|| format!("Unable to read from {}", path.display()))?;

    match outcome {
        LoadOutcome::Missing { path } => {
            eprintln!(
                "No previous data found. {} will be created upon saving.",
                path.display()
            );
        }
        LoadOutcome::Loaded { skipped, .. } => {
            for row in skipped {
                eprintln!("Skipping entry. {}", row);
            }
        }
    }
    Ok(ledger)
}

fn save_ledger(ledger: &ExpenseLedger, path: &Path) -> Result<()> {
    let outcome = ledger
        .save(path)
        .with_context(|| format!("Unable to save expenses to {}", path.display()))?;
    eprintln!(
        "Saved {} expense(s) to {}",
        outcome.written,
        outcome.path.display()
    );
    Ok(())
}

fn parse_amount(input: &str) -> Result<Cents> {
    parse_cents(input).with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", input))
}

fn print_expenses<'a>(
    expenses: impl Iterator<Item = (usize, &'a ExpenseRecord)>,
    numbered: bool,
) {
    for (index, expense) in expenses {
        let line = format_expense_line(expense);
        if numbered {
            println!("{:>4}  {}", index, line);
        } else {
            println!("{}", line);
        }
    }
}

/// `date | category | description | $amount`
pub fn format_expense_line(expense: &ExpenseRecord) -> String {
    format!(
        "{} | {} | {} | ${}",
        expense.date,
        expense.category,
        expense.description,
        format_cents(expense.amount_cents)
    )
}

fn print_update(outcome: &UpdateOutcome) {
    for err in &outcome.rejected {
        eprintln!("Error: {}", err);
    }
    let record = &outcome.record;
    println!(
        "Expense updated: {} - {} on {} in {}",
        record.description,
        format_cents(record.amount_cents),
        record.date,
        record.category
    );
}

fn print_report(report: &CategoryReport, format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        "csv" => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["category", "total", "count", "average", "percentage"])?;
            for cat in &report.categories {
                writer.write_record([
                    cat.category.clone(),
                    format_cents(cat.total),
                    cat.count.to_string(),
                    format_cents(cat.average),
                    format!("{:.2}", cat.percentage),
                ])?;
            }
            writer.flush()?;
        }
        "table" => {
            if report.categories.is_empty() {
                println!("No expenses recorded.");
                return Ok(());
            }

            println!(
                "{:<20} {:>12} {:>8} {:>12} {:>8}",
                "CATEGORY", "TOTAL", "COUNT", "AVERAGE", "PERCENT"
            );
            println!("{}", "-".repeat(65));

            for cat in &report.categories {
                println!(
                    "{:<20} {:>12} {:>8} {:>12} {:>7.1}%",
                    truncate(&cat.category, 20),
                    format_cents(cat.total),
                    cat.count,
                    format_cents(cat.average),
                    cat.percentage
                );
            }

            println!("{}", "-".repeat(65));
            println!(
                "{:<20} {:>12} {:>8}",
                "TOTAL",
                format_cents(report.total),
                report.count
            );
        }
        other => {
            anyhow::bail!("Invalid format '{}'. Valid formats: table, json, csv", other);
        }
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
