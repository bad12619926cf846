use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::ledger::date::OUTPUT_DATE_FORMAT;

/// Error type that captures ledger model, input, and persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid date format: `{0}` (accepted: DD-MM-YY, DD-Mon-YY, DD-Mon-YYYY)")]
    InvalidDateFormat(String),
    #[error("Date {} is in the future", .0.format(OUTPUT_DATE_FORMAT))]
    FutureDate(NaiveDate),
    #[error("Invalid account type `{0}` (expected one of: Current, Debit, Savings, Credit, Mortgage)")]
    InvalidAccountType(String),
    #[error("Malformed source at line {line}: {reason}")]
    MalformedSource { line: usize, reason: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Account `{0}` already exists")]
    DuplicateAccount(String),
    #[error("Date {} is already tracked", .0.format(OUTPUT_DATE_FORMAT))]
    DuplicateDate(NaiveDate),
    #[error("Cannot save to {} without overwriting", .0.display())]
    SaveRefused(PathBuf),
    #[error("Account `{account}` holds an entry for {date}, which is not a ledger date")]
    InconsistentHistory { account: String, date: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LedgerError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        LedgerError::MalformedSource {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failures surfaced by the interactive shell and entry point.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
    #[error("{0}")]
    InvalidArguments(String),
    #[error("input ended before the operation finished")]
    InputClosed,
}
