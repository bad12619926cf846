use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::date::{canonical, DateResolver};
use crate::errors::{LedgerError, Result};

/// Currency assumed when none is given.
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Closed set of supported account types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Current,
    Debit,
    Savings,
    Credit,
    Mortgage,
}

impl AccountKind {
    pub const ALL: [AccountKind; 5] = [
        AccountKind::Current,
        AccountKind::Debit,
        AccountKind::Savings,
        AccountKind::Credit,
        AccountKind::Mortgage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Current => "Current",
            AccountKind::Debit => "Debit",
            AccountKind::Savings => "Savings",
            AccountKind::Credit => "Credit",
            AccountKind::Mortgage => "Mortgage",
        }
    }

    /// Credit and mortgage balances are money owed.
    pub fn is_liability(&self) -> bool {
        matches!(self, AccountKind::Credit | AccountKind::Mortgage)
    }

    /// `-1` for liabilities, `1` otherwise.
    pub fn sign(&self) -> Decimal {
        if self.is_liability() {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ONE
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        AccountKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LedgerError::InvalidAccountType(trimmed.to_string()))
    }
}

/// A raw ledger cell, classified once when it is entered or loaded.
///
/// Numeric and text cells keep the exact text they were read from, so a load
/// followed by a save writes every non-empty cell back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EntryValue {
    /// No data for the date. Not the same as zero.
    #[default]
    Empty,
    Numeric { amount: Decimal, raw: String },
    Text(String),
}

impl EntryValue {
    /// Classifies free text: blank is `Empty`, a numeric literal is `Numeric`, anything else `Text`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return EntryValue::Empty;
        }
        if !is_numeric_literal(trimmed) {
            return EntryValue::Text(raw.to_string());
        }
        match Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
            Ok(amount) => EntryValue::Numeric {
                amount,
                raw: raw.to_string(),
            },
            Err(_) => EntryValue::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, EntryValue::Empty)
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            EntryValue::Numeric { amount, .. } => Some(*amount),
            _ => None,
        }
    }
}

/// Plain or scientific decimal notation only; digit separators stay text.
fn is_numeric_literal(text: &str) -> bool {
    text.bytes().any(|byte| byte.is_ascii_digit())
        && text
            .bytes()
            .all(|byte| byte.is_ascii_digit() || matches!(byte, b'+' | b'-' | b'.' | b'e' | b'E'))
}

impl fmt::Display for EntryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryValue::Empty => Ok(()),
            EntryValue::Numeric { raw, .. } => f.write_str(raw),
            EntryValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for EntryValue {
    fn from(raw: &str) -> Self {
        EntryValue::parse(raw)
    }
}

impl From<Decimal> for EntryValue {
    fn from(amount: Decimal) -> Self {
        EntryValue::Numeric {
            amount,
            raw: amount.to_string(),
        }
    }
}

/// Compares two account names ignoring surrounding whitespace and case.
pub fn names_match(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// A date given either already resolved or as operator text.
#[derive(Debug, Clone, Copy)]
pub enum DateInput<'a> {
    Resolved(NaiveDate),
    Text(&'a str),
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(date: NaiveDate) -> Self {
        DateInput::Resolved(date)
    }
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        DateInput::Text(text)
    }
}

impl DateInput<'_> {
    pub fn resolve(self, resolver: &DateResolver) -> Result<NaiveDate> {
        match self {
            DateInput::Resolved(date) => Ok(date),
            DateInput::Text(text) => resolver.resolve(text),
        }
    }
}

/// One ledger row: a named account and its value history.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    name: String,
    kind: AccountKind,
    currency: String,
    /// Insertion-ordered; at most one entry per date.
    history: Vec<(NaiveDate, EntryValue)>,
    /// 1-based row in the file the account was loaded from.
    source_line: Option<usize>,
}

impl Account {
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self::with_currency(name, kind, DEFAULT_CURRENCY)
    }

    pub fn with_currency(
        name: impl Into<String>,
        kind: AccountKind,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            kind,
            currency: currency.into().to_uppercase(),
            history: Vec::new(),
            source_line: None,
        }
    }

    /// Builds an account from a textual type, failing on anything outside [`AccountKind::ALL`].
    pub fn parse(name: impl Into<String>, kind: &str) -> Result<Self> {
        Ok(Self::new(name, kind.parse()?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Row of the source file this account came from, when it was loaded.
    pub fn source_line(&self) -> Option<usize> {
        self.source_line
    }

    pub(crate) fn set_source_line(&mut self, line: usize) {
        self.source_line = Some(line);
    }

    /// Case-insensitive name comparison, Unicode-aware.
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    /// Upserts the value for a date; text dates go through the system [`DateResolver`].
    pub fn add_entry<'a>(
        &mut self,
        value: impl Into<EntryValue>,
        date: impl Into<DateInput<'a>>,
    ) -> Result<()> {
        self.add_entry_with(&DateResolver::system(), value, date)
    }

    pub fn add_entry_with<'a>(
        &mut self,
        resolver: &DateResolver,
        value: impl Into<EntryValue>,
        date: impl Into<DateInput<'a>>,
    ) -> Result<()> {
        let date = date.into().resolve(resolver)?;
        self.set(date, value.into());
        Ok(())
    }

    pub(crate) fn set(&mut self, date: NaiveDate, value: EntryValue) {
        match self.history.iter_mut().find(|(existing, _)| *existing == date) {
            Some((_, slot)) => *slot = value,
            None => self.history.push((date, value)),
        }
    }

    pub(crate) fn remove(&mut self, date: NaiveDate) -> Option<EntryValue> {
        let index = self
            .history
            .iter()
            .position(|(existing, _)| *existing == date)?;
        Some(self.history.remove(index).1)
    }

    /// Whether the history has a key for `date`, even one holding the empty marker.
    pub fn has_entry(&self, date: NaiveDate) -> bool {
        self.history.iter().any(|(existing, _)| *existing == date)
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&EntryValue> {
        self.history
            .iter()
            .find(|(existing, _)| *existing == date)
            .map(|(_, value)| value)
    }

    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, &EntryValue)> + '_ {
        self.history.iter().map(|(date, value)| (*date, value))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.history.iter().map(|(date, _)| *date)
    }

    /// Stored value for `date`.
    ///
    /// When nothing is stored and `interpolate` is set, the value is linearly
    /// interpolated in time between the closest earlier and later numeric
    /// entries, rounded to two decimal places. Without both neighbours the
    /// result is [`EntryValue::Empty`]; values are never extrapolated.
    pub fn value_on(&self, date: NaiveDate, interpolate: bool) -> EntryValue {
        match self.entry(date) {
            Some(value) if !(interpolate && value.is_empty()) => value.clone(),
            _ if interpolate => self
                .interpolate(date)
                .map(EntryValue::from)
                .unwrap_or_default(),
            _ => EntryValue::Empty,
        }
    }

    fn interpolate(&self, date: NaiveDate) -> Option<Decimal> {
        let numeric = || {
            self.history
                .iter()
                .filter_map(|(at, value)| value.as_decimal().map(|amount| (*at, amount)))
        };
        let (before_date, before) = numeric()
            .filter(|(at, _)| *at < date)
            .max_by_key(|(at, _)| *at)?;
        let (after_date, after) = numeric()
            .filter(|(at, _)| *at > date)
            .min_by_key(|(at, _)| *at)?;

        let span = Decimal::from((after_date - before_date).num_days());
        let elapsed = Decimal::from((date - before_date).num_days());
        let value = after
            .checked_sub(before)?
            .checked_mul(elapsed)?
            .checked_div(span)?
            .checked_add(before)?;
        Some(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Interpolated value with the liability sign applied, for charting.
    ///
    /// Returns `None` when there is no numeric value to plot.
    pub fn signed_value(&self, date: NaiveDate) -> Option<f64> {
        self.value_on(date, true)
            .as_decimal()
            .and_then(|amount| amount.checked_mul(self.kind.sign()))
            .and_then(|amount| amount.to_f64())
    }

    /// `(date, value)` pairs in the order they were added.
    pub fn describe(&self) -> impl Iterator<Item = (String, &EntryValue)> + '_ {
        self.history
            .iter()
            .map(|(date, value)| (canonical(*date), value))
    }

    /// Number of entries holding actual data.
    pub fn populated_entries(&self) -> usize {
        self.history
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::date::FixedClock;
    use rust_decimal::Decimal;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn kind_parsing_is_case_insensitive_and_canonical() {
        assert_eq!("savings".parse::<AccountKind>().unwrap(), AccountKind::Savings);
        assert_eq!("MORTGAGE".parse::<AccountKind>().unwrap().to_string(), "Mortgage");
        assert!(matches!(
            "pension".parse::<AccountKind>(),
            Err(LedgerError::InvalidAccountType(kind)) if kind == "pension"
        ));
        assert!(Account::parse("Isa", "stocks").is_err());
    }

    #[test]
    fn entry_values_are_classified_once() {
        assert_eq!(EntryValue::parse("  "), EntryValue::Empty);
        assert_eq!(EntryValue::parse("100"), EntryValue::from(Decimal::from(100)));
        assert_eq!(EntryValue::parse("-12.50").to_string(), "-12.50");
        assert_eq!(EntryValue::parse("1e3").as_decimal(), Some(Decimal::from(1000)));
        assert_eq!(EntryValue::parse("1e3").to_string(), "1e3");
        assert_eq!(EntryValue::parse("closed"), EntryValue::Text("closed".into()));
        assert_eq!(EntryValue::parse("1_000"), EntryValue::Text("1_000".into()));
        assert_eq!(EntryValue::parse(" padded ").to_string(), " padded ");
    }

    #[test]
    fn add_entry_upserts_by_date() {
        let resolver = DateResolver::with_clock(FixedClock(ymd(2024, 1, 1)));
        let mut account = Account::new("Alpha", AccountKind::Current);
        account.add_entry_with(&resolver, "10", "01-Jan-2020").unwrap();
        account.add_entry_with(&resolver, "20", ymd(2020, 1, 1)).unwrap();
        account.add_entry_with(&resolver, "5", "01-02-21").unwrap();

        let described: Vec<_> = account
            .describe()
            .map(|(date, value)| (date, value.to_string()))
            .collect();
        assert_eq!(
            described,
            vec![
                ("01-Jan-2020".to_string(), "20".to_string()),
                ("01-Feb-2021".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn add_entry_rejects_bad_dates() {
        let resolver = DateResolver::with_clock(FixedClock(ymd(2024, 1, 1)));
        let mut account = Account::new("Alpha", AccountKind::Current);
        assert!(account.add_entry_with(&resolver, "1", "not a date").is_err());
        assert!(account.add_entry_with(&resolver, "1", "02-Jan-2024").is_err());
        assert_eq!(account.describe().count(), 0);
    }

    #[test]
    fn value_on_without_interpolation_returns_empty_marker() {
        let mut account = Account::new("Alpha", AccountKind::Current);
        account.set(ymd(2020, 1, 1), EntryValue::parse("100"));
        assert_eq!(account.value_on(ymd(2020, 1, 1), false).to_string(), "100");
        assert_eq!(account.value_on(ymd(2020, 6, 1), false), EntryValue::Empty);
    }

    #[test]
    fn interpolation_is_linear_in_time_without_extrapolation() {
        let mut account = Account::new("Alpha", AccountKind::Savings);
        account.set(ymd(2020, 1, 1), EntryValue::parse("100"));
        account.set(ymd(2020, 1, 11), EntryValue::parse("200"));
        account.set(ymd(2020, 1, 21), EntryValue::parse("frozen"));

        assert_eq!(
            account.value_on(ymd(2020, 1, 4), true).as_decimal(),
            Some(Decimal::from(130))
        );
        assert_eq!(account.value_on(ymd(2019, 12, 1), true), EntryValue::Empty);
        assert_eq!(account.value_on(ymd(2020, 1, 15), true), EntryValue::Empty);
    }

    #[test]
    fn interpolation_overflow_yields_no_value() {
        let mut account = Account::new("Alpha", AccountKind::Savings);
        account.set(ymd(2020, 1, 1), EntryValue::parse("1e27"));
        account.set(ymd(2021, 1, 1), EntryValue::parse("2e28"));

        assert_eq!(account.value_on(ymd(2020, 7, 1), true), EntryValue::Empty);
        assert_eq!(account.signed_value(ymd(2020, 7, 1)), None);
        assert!(account.signed_value(ymd(2021, 1, 1)).is_some());
    }

    #[test]
    fn signed_value_negates_liabilities() {
        let mut card = Account::new("Card", AccountKind::Credit);
        card.set(ymd(2020, 1, 1), EntryValue::parse("250.5"));
        assert_eq!(card.signed_value(ymd(2020, 1, 1)), Some(-250.5));

        let mut current = Account::new("Bank", AccountKind::Current);
        current.set(ymd(2020, 1, 1), EntryValue::parse("40"));
        current.set(ymd(2020, 2, 1), EntryValue::parse("n/a"));
        assert_eq!(current.signed_value(ymd(2020, 1, 1)), Some(40.0));
        assert_eq!(current.signed_value(ymd(2020, 2, 1)), None);
    }

    #[test]
    fn names_compare_case_insensitively() {
        let account = Account::new("  Alpha ", AccountKind::Debit);
        assert_eq!(account.name(), "Alpha");
        assert!(account.is_named("alpha"));
        assert!(account.is_named("ALPHA"));
        assert!(!account.is_named("alph"));

        let account = Account::new("Épargne", AccountKind::Savings);
        assert!(account.is_named("ÉPARGNE"));
        assert!(names_match(" épargne", "ÉPARGNE "));
        assert_eq!(account.currency(), DEFAULT_CURRENCY);
    }
}
