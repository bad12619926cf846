//! Chart-ready series for a plotting front end.
//!
//! Values come from [`Account::signed_value`], so liabilities are already
//! negative and a renderer never needs to know the account arithmetic.

use chrono::NaiveDate;

use super::{
    account::{names_match, Account, AccountKind},
    ledger::{Ledger, TOTALS_NAME},
};
use crate::errors::{LedgerError, Result};

/// Which half of a two-panel chart a series belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Assets,
    Liabilities,
}

impl From<AccountKind> for Panel {
    fn from(kind: AccountKind) -> Self {
        if kind.is_liability() {
            Panel::Liabilities
        } else {
            Panel::Assets
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub kind: AccountKind,
    pub panel: Panel,
    /// One point per requested date; dates without a numeric value plot as zero.
    pub points: Vec<(NaiveDate, f64)>,
}

impl Series {
    fn from_account(account: &Account, dates: &[NaiveDate]) -> Self {
        Self {
            name: account.name().to_string(),
            kind: account.kind(),
            panel: account.kind().into(),
            points: dates
                .iter()
                .map(|date| (*date, account.signed_value(*date).unwrap_or(0.0)))
                .collect(),
        }
    }
}

/// Builds one series per requested name, in request order.
///
/// Names match case-insensitively; [`TOTALS_NAME`] selects the aggregate of all accounts.
pub fn build_series(ledger: &Ledger, names: &[&str], dates: &[NaiveDate]) -> Result<Vec<Series>> {
    let mut totals = None;
    names
        .iter()
        .map(|name| {
            if names_match(name, TOTALS_NAME) {
                let totals = totals.get_or_insert_with(|| ledger.totals());
                return Ok(Series::from_account(totals, dates));
            }
            ledger
                .account(name)
                .map(|account| Series::from_account(account, dates))
                .ok_or_else(|| LedgerError::NotFound(format!("account `{}`", name.trim())))
        })
        .collect()
}

/// Every account plus the totals, over the ledger's dates in chronological order.
pub fn build_all_series(ledger: &Ledger) -> Vec<Series> {
    let mut dates = ledger.dates().to_vec();
    dates.sort();
    let totals = ledger.totals();
    ledger
        .accounts()
        .iter()
        .chain(std::iter::once(&totals))
        .map(|account| Series::from_account(account, &dates))
        .collect()
}
