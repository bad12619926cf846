use std::{
    collections::HashSet,
    fmt,
    fs::File,
    io::{Read, Write},
    path::Path,
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::{
    account::{names_match, Account, AccountKind, EntryValue, DEFAULT_CURRENCY},
    date::{canonical, DateResolver},
};
use crate::errors::{LedgerError, Result};
use crate::utils::persistence::{self, TEMPLATE_HEADER};

/// Name of the aggregate pseudo-account built by [`Ledger::totals`].
pub const TOTALS_NAME: &str = "Total Money";

/// Accounts tracked against one shared axis of dates.
///
/// Every key in an account's history is one of `dates`. The converse does not
/// hold: an account may have nothing recorded for a ledger date.
#[derive(Debug, Clone)]
pub struct Ledger {
    accounts: Vec<Account>,
    dates: Vec<NaiveDate>,
    currency: String,
    modified: bool,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::with_currency(DEFAULT_CURRENCY)
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty ledger whose accounts are held in `currency`.
    pub fn with_currency(currency: impl Into<String>) -> Self {
        Self {
            accounts: Vec::new(),
            dates: Vec::new(),
            currency: currency.into().to_uppercase(),
            modified: false,
        }
    }

    /// Reconstructs a ledger from its tabular form, in the default currency.
    pub fn load(source: impl Read, resolver: &DateResolver) -> Result<Self> {
        Self::load_with_currency(source, resolver, DEFAULT_CURRENCY)
    }

    /// Reconstructs a ledger from its tabular form.
    ///
    /// Any structural problem (column count, unknown type, bad or duplicate
    /// date, duplicate or blank account name) fails the whole load.
    pub fn load_with_currency(
        source: impl Read,
        resolver: &DateResolver,
        currency: &str,
    ) -> Result<Self> {
        let mut ledger = Self::with_currency(currency);
        let Some(table) = persistence::read_table(source)? else {
            return Err(LedgerError::malformed(1, "missing header row"));
        };
        if table.header.len() < TEMPLATE_HEADER.len() {
            return Err(LedgerError::malformed(
                1,
                "header needs an account column and a type column",
            ));
        }

        let mut dates = Vec::with_capacity(table.header.len() - 2);
        for (column, cell) in table.header.iter().enumerate().skip(2) {
            let date = resolver.resolve(cell).map_err(|err| {
                LedgerError::malformed(1, format!("column {}: {err}", column + 1))
            })?;
            if dates.contains(&date) {
                return Err(LedgerError::malformed(
                    1,
                    format!("date {} appears more than once", canonical(date)),
                ));
            }
            dates.push(date);
        }

        let mut accounts: Vec<Account> = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            if row.cells.len() != table.header.len() {
                return Err(LedgerError::malformed(
                    row.line,
                    format!(
                        "expected {} columns, found {}",
                        table.header.len(),
                        row.cells.len()
                    ),
                ));
            }
            let name = row.cells[0].trim();
            if name.is_empty() {
                return Err(LedgerError::malformed(row.line, "blank account name"));
            }
            if accounts.iter().any(|account| account.is_named(name)) {
                return Err(LedgerError::malformed(
                    row.line,
                    format!("account `{name}` appears more than once"),
                ));
            }
            let kind = row.cells[1]
                .parse::<AccountKind>()
                .map_err(|err| LedgerError::malformed(row.line, err.to_string()))?;
            let mut account = Account::with_currency(name, kind, &ledger.currency);
            account.set_source_line(row.line);
            for (date, cell) in dates.iter().zip(&row.cells[2..]) {
                account.set(*date, EntryValue::parse(cell));
            }
            accounts.push(account);
        }

        info!(
            accounts = accounts.len(),
            dates = dates.len(),
            "ledger loaded"
        );
        ledger.accounts = accounts;
        ledger.dates = dates;
        Ok(ledger)
    }

    pub fn load_from_path(path: &Path, resolver: &DateResolver) -> Result<Self> {
        let file = File::open(path)?;
        Self::load(file, resolver)
    }

    /// Writes the ledger to `destination`, refusing to replace an existing file
    /// unless `allow_overwrite` is set.
    ///
    /// Date columns follow the stored order of `dates`; call
    /// [`Ledger::sort_dates`] first for chronological columns.
    pub fn save(&mut self, destination: &Path, allow_overwrite: bool) -> Result<()> {
        if destination.exists() && !allow_overwrite {
            warn!(path = %destination.display(), "save refused: file exists");
            return Err(LedgerError::SaveRefused(destination.to_path_buf()));
        }
        persistence::write_atomic(destination, |file| self.write_to(file))?;
        self.modified = false;
        info!(path = %destination.display(), "ledger saved");
        Ok(())
    }

    /// Serializes the tabular form into `sink`.
    pub fn write_to(&self, sink: impl Write) -> Result<()> {
        let mut header: Vec<String> = TEMPLATE_HEADER
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        header.extend(self.dates.iter().map(|date| canonical(*date)));

        let rows: Vec<Vec<String>> = self
            .accounts
            .iter()
            .map(|account| {
                let mut row = vec![account.name().to_string(), account.kind().to_string()];
                row.extend(
                    self.dates
                        .iter()
                        .map(|date| account.value_on(*date, false).to_string()),
                );
                row
            })
            .collect();

        persistence::write_table(sink, &header, &rows)
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn has_date(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Case-insensitive lookup.
    pub fn account(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.is_named(name))
    }

    pub fn account_names(&self) -> Vec<&str> {
        self.accounts.iter().map(Account::name).collect()
    }

    /// Whether a committed mutation happened since the last load or save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Inserts `account`, replacing any account with the same name. Returns the replaced account.
    ///
    /// The account's history is not checked against `dates`; run
    /// [`Ledger::check_consistency`] before committing operator-built accounts.
    pub fn add_account(&mut self, account: Account) -> Option<Account> {
        self.modified = true;
        info!(account = account.name(), kind = %account.kind(), "account added");
        match self
            .accounts
            .iter_mut()
            .find(|existing| existing.is_named(account.name()))
        {
            Some(slot) => Some(std::mem::replace(slot, account)),
            None => {
                self.accounts.push(account);
                None
            }
        }
    }

    pub fn remove_account(&mut self, name: &str) -> Result<Account> {
        let index = self
            .accounts
            .iter()
            .position(|account| account.is_named(name))
            .ok_or_else(|| LedgerError::NotFound(format!("account `{}`", name.trim())))?;
        self.modified = true;
        let removed = self.accounts.remove(index);
        info!(account = removed.name(), "account removed");
        Ok(removed)
    }

    /// Appends a date to the shared axis without touching any account.
    pub fn add_date(&mut self, date: NaiveDate) -> Result<()> {
        if self.has_date(date) {
            return Err(LedgerError::DuplicateDate(date));
        }
        self.dates.push(date);
        self.modified = true;
        info!(date = %canonical(date), "date added");
        Ok(())
    }

    /// Adds a date together with a value for each named account, as one step.
    ///
    /// Every name is checked before anything changes, so a failure leaves the
    /// ledger untouched. Accounts not listed get no entry for the date.
    pub fn insert_date<'a, I>(&mut self, date: NaiveDate, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, EntryValue)>,
    {
        if self.has_date(date) {
            return Err(LedgerError::DuplicateDate(date));
        }
        let mut resolved = Vec::new();
        for (name, value) in values {
            let index = self
                .accounts
                .iter()
                .position(|account| account.is_named(name))
                .ok_or_else(|| LedgerError::NotFound(format!("account `{name}`")))?;
            resolved.push((index, value));
        }

        for (index, value) in resolved {
            self.accounts[index].set(date, value);
        }
        self.add_date(date)
    }

    /// Removes a date from the axis and from every account's history.
    pub fn remove_date(&mut self, date: NaiveDate) -> Result<()> {
        let index = self
            .dates
            .iter()
            .position(|existing| *existing == date)
            .ok_or_else(|| LedgerError::NotFound(format!("date {}", canonical(date))))?;
        self.dates.remove(index);
        for account in &mut self.accounts {
            account.remove(date);
        }
        self.modified = true;
        info!(date = %canonical(date), "date removed");
        Ok(())
    }

    /// Overwrites one account's value on an existing ledger date. Returns the previous value.
    pub fn set_value(
        &mut self,
        name: &str,
        date: NaiveDate,
        value: EntryValue,
    ) -> Result<Option<EntryValue>> {
        if !self.has_date(date) {
            return Err(LedgerError::NotFound(format!("date {}", canonical(date))));
        }
        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.is_named(name))
            .ok_or_else(|| LedgerError::NotFound(format!("account `{}`", name.trim())))?;
        let previous = account.entry(date).cloned();
        account.set(date, value);
        self.modified = true;
        info!(account = account.name(), date = %canonical(date), "value updated");
        Ok(previous)
    }

    /// Fails on the first account holding a date that is not on the shared axis.
    pub fn check_consistency(&self) -> Result<()> {
        self.check_account(self.accounts.iter())
    }

    /// Same check as [`Ledger::check_consistency`] for an account not yet committed.
    pub fn check_candidate(&self, account: &Account) -> Result<()> {
        self.check_account(std::iter::once(account))
    }

    fn check_account<'a>(&self, accounts: impl Iterator<Item = &'a Account>) -> Result<()> {
        for account in accounts {
            if let Some(stray) = account.dates().find(|date| !self.has_date(*date)) {
                return Err(LedgerError::InconsistentHistory {
                    account: account.name().to_string(),
                    date: canonical(stray),
                });
            }
        }
        Ok(())
    }

    /// Orders the shared axis chronologically.
    pub fn sort_dates(&mut self) {
        if !self.dates.windows(2).all(|pair| pair[0] <= pair[1]) {
            self.dates.sort();
            self.modified = true;
        }
    }

    pub fn summary(&self) -> LedgerSummary {
        let span = match (self.dates.iter().min(), self.dates.iter().max()) {
            (Some(first), Some(last)) => {
                let years = (*last - *first).num_days() as f64 / 365.0;
                Some(DateSpan {
                    first: *first,
                    last: *last,
                    years: (years * 100.0).round() / 100.0,
                })
            }
            _ => None,
        };
        LedgerSummary {
            account_count: self.accounts.len(),
            date_count: self.dates.len(),
            span,
            populated: self
                .accounts
                .iter()
                .map(|account| (account.name().to_string(), account.populated_entries()))
                .collect(),
        }
    }

    /// Every account's stored value on `date`, without interpolation.
    pub fn report_on(&self, date: NaiveDate) -> DateReport {
        DateReport {
            date,
            rows: self
                .accounts
                .iter()
                .map(|account| DateReportRow {
                    name: account.name().to_string(),
                    kind: account.kind(),
                    currency: account.currency().to_string(),
                    value: account.value_on(date, false),
                })
                .collect(),
        }
    }

    /// One [`DateReport`] per date, in stored order.
    pub fn full_report(&self) -> Vec<DateReport> {
        self.dates.iter().map(|date| self.report_on(*date)).collect()
    }

    /// Aggregate account whose value on each date is the signed sum of every numeric entry.
    pub fn totals(&self) -> Account {
        let mut totals =
            Account::with_currency(TOTALS_NAME, AccountKind::Current, &self.currency);
        for date in &self.dates {
            let amounts: Vec<Decimal> = self
                .accounts
                .iter()
                .filter_map(|account| {
                    account
                        .value_on(*date, false)
                        .as_decimal()
                        .and_then(|amount| amount.checked_mul(account.kind().sign()))
                })
                .collect();
            let value = if amounts.is_empty() {
                EntryValue::Empty
            } else {
                match amounts
                    .into_iter()
                    .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount))
                {
                    Some(sum) => EntryValue::from(sum),
                    None => {
                        warn!(date = %canonical(*date), "total overflowed; left empty");
                        EntryValue::Empty
                    }
                }
            };
            totals.set(*date, value);
        }
        totals
    }

    /// Folds another ledger into this one.
    ///
    /// Unknown dates are appended, unknown accounts added, and non-empty values
    /// of known accounts overwrite what is stored. An account whose type
    /// disagrees between the two ledgers aborts the merge before any change.
    pub fn merge(&mut self, other: Ledger) -> Result<MergeReport> {
        for incoming in &other.accounts {
            if let Some(existing) = self.account(incoming.name()) {
                if existing.kind() != incoming.kind() {
                    return Err(LedgerError::malformed(
                        incoming.source_line().unwrap_or(0),
                        format!(
                            "account `{}` is {} in the import but {} in the ledger",
                            incoming.name(),
                            incoming.kind(),
                            existing.kind()
                        ),
                    ));
                }
            }
        }

        let mut report = MergeReport::default();
        let known: HashSet<NaiveDate> = self.dates.iter().copied().collect();
        for date in other.dates.iter().filter(|date| !known.contains(date)) {
            self.dates.push(*date);
            report.dates_added += 1;
        }

        for incoming in other.accounts {
            match self
                .accounts
                .iter_mut()
                .find(|existing| existing.is_named(incoming.name()))
            {
                Some(existing) => {
                    for (date, value) in incoming.entries() {
                        if !value.is_empty() && existing.entry(date) != Some(value) {
                            existing.set(date, value.clone());
                            report.values_updated += 1;
                        }
                    }
                }
                None => {
                    self.accounts.push(incoming);
                    report.accounts_added += 1;
                }
            }
        }

        if report.changed() {
            self.modified = true;
        }
        info!(
            dates_added = report.dates_added,
            accounts_added = report.accounts_added,
            values_updated = report.values_updated,
            "ledger merged"
        );
        Ok(report)
    }
}

/// First and last ledger dates and the distance between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateSpan {
    pub first: NaiveDate,
    pub last: NaiveDate,
    /// Days between `first` and `last` over 365, to two decimals.
    pub years: f64,
}

/// Read-only overview of a ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub account_count: usize,
    pub date_count: usize,
    pub span: Option<DateSpan>,
    /// Non-empty entry count per account, in display order.
    pub populated: Vec<(String, usize)>,
}

impl fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Data loaded for {} bank accounts on {} dates.",
            self.account_count, self.date_count
        )?;
        for (name, count) in &self.populated {
            writeln!(f, "    {name}: {count}")?;
        }
        match &self.span {
            Some(span) => write!(
                f,
                "Dates span from {} to {}. ({:.2} years)",
                canonical(span.first),
                canonical(span.last),
                span.years
            ),
            None => write!(f, "No dates recorded yet."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateReportRow {
    pub name: String,
    pub kind: AccountKind,
    pub currency: String,
    pub value: EntryValue,
}

/// Every account's value on a single date.
#[derive(Debug, Clone, PartialEq)]
pub struct DateReport {
    pub date: NaiveDate,
    pub rows: Vec<DateReportRow>,
}

impl DateReport {
    pub fn value_of(&self, name: &str) -> Option<&EntryValue> {
        self.rows
            .iter()
            .find(|row| names_match(&row.name, name))
            .map(|row| &row.value)
    }
}

impl fmt::Display for DateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reporting all bank accounts for {}:", canonical(self.date))?;
        let width = self.rows.iter().map(|row| row.name.len()).max().unwrap_or(0);
        for row in &self.rows {
            let label = format!("{} ({})", row.name, row.kind);
            write!(
                f,
                "\n    {:<pad$} - {}",
                label,
                format_value(&row.value, &row.currency),
                pad = width + 11
            )?;
        }
        Ok(())
    }
}

/// Outcome counters of [`Ledger::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub dates_added: usize,
    pub accounts_added: usize,
    pub values_updated: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.dates_added + self.accounts_added + self.values_updated > 0
    }
}

/// Renders a cell for display: amounts get the currency symbol, blanks read "no data".
pub fn format_value(value: &EntryValue, currency: &str) -> String {
    match value {
        EntryValue::Empty => "no data".to_string(),
        EntryValue::Numeric { amount, .. } => match currency_symbol(currency) {
            Some(symbol) if amount.is_sign_negative() => format!("-{symbol}{}", amount.abs()),
            Some(symbol) => format!("{symbol}{amount}"),
            None => format!("{amount} {currency}"),
        },
        EntryValue::Text(text) => text.clone(),
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "GBP" => Some("£"),
        "USD" => Some("$"),
        "EUR" => Some("€"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::date::FixedClock;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolver() -> DateResolver {
        DateResolver::with_clock(FixedClock(ymd(2024, 1, 1)))
    }

    fn sample() -> Ledger {
        let source = "Account,Type,01-Jan-2020,01-Jan-2021\n\
                      A,Current,100,100\n\
                      B,Credit,100,\n";
        Ledger::load(source.as_bytes(), &resolver()).unwrap()
    }

    #[test]
    fn load_builds_accounts_and_dates() {
        let ledger = sample();
        assert_eq!(ledger.dates(), &[ymd(2020, 1, 1), ymd(2021, 1, 1)]);
        assert_eq!(ledger.account_names(), vec!["A", "B"]);
        assert_eq!(ledger.account("b").unwrap().kind(), AccountKind::Credit);
        assert!(ledger.account("B").unwrap().has_entry(ymd(2021, 1, 1)));
        assert!(!ledger.is_modified());
        ledger.check_consistency().unwrap();
    }

    #[test]
    fn load_rejects_structural_problems() {
        let cases = [
            ("", 1),
            ("Account\n", 1),
            ("Account,Type,31-Feb-2020\n", 1),
            ("Account,Type,01-Jan-2030\n", 1),
            ("Account,Type,01-Jan-2020,01-01-20\n", 1),
            ("Account,Type,01-Jan-2020\nA,Current\n", 2),
            ("Account,Type,01-Jan-2020\nA,Current,1\nB,Pension,2\n", 3),
            ("Account,Type,01-Jan-2020\nA,Current,1\na,Debit,2\n", 3),
            ("Account,Type,01-Jan-2020\n ,Current,1\n", 2),
        ];
        for (source, expected_line) in cases {
            match Ledger::load(source.as_bytes(), &resolver()) {
                Err(LedgerError::MalformedSource { line, .. }) => {
                    assert_eq!(line, expected_line, "source {source:?}")
                }
                other => panic!("expected malformed source for {source:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn report_on_lists_every_account() {
        let ledger = sample();
        let report = ledger.report_on(ymd(2020, 1, 1));
        assert_eq!(report.value_of("A").unwrap().to_string(), "100");
        assert_eq!(report.value_of("B").unwrap().to_string(), "100");

        let later = ledger.report_on(ymd(2021, 1, 1));
        assert_eq!(later.value_of("b"), Some(&EntryValue::Empty));
        assert!(later.to_string().contains("B (Credit)"));
        assert!(later.to_string().contains("no data"));
    }

    #[test]
    fn remove_date_clears_every_history() {
        let mut ledger = sample();
        ledger.remove_date(ymd(2021, 1, 1)).unwrap();
        assert_eq!(ledger.dates(), &[ymd(2020, 1, 1)]);
        for account in ledger.accounts() {
            assert!(!account.has_entry(ymd(2021, 1, 1)));
        }
        assert!(ledger.is_modified());
        assert!(matches!(
            ledger.remove_date(ymd(2021, 1, 1)),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn insert_date_is_all_or_nothing() {
        let mut ledger = sample();
        let date = ymd(2022, 1, 1);
        let result = ledger.insert_date(
            date,
            [("A", EntryValue::parse("1")), ("Z", EntryValue::parse("2"))],
        );
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
        assert!(!ledger.has_date(date));
        assert!(!ledger.account("A").unwrap().has_entry(date));

        ledger
            .insert_date(
                date,
                [("a", EntryValue::parse("1")), ("B", EntryValue::parse("x"))],
            )
            .unwrap();
        assert!(ledger.has_date(date));
        ledger.check_consistency().unwrap();
        assert!(matches!(
            ledger.insert_date(date, Vec::<(&str, EntryValue)>::new()),
            Err(LedgerError::DuplicateDate(_))
        ));
    }

    #[test]
    fn add_and_remove_accounts_case_insensitively() {
        let mut ledger = sample();
        assert!(ledger
            .add_account(Account::new("Alpha", AccountKind::Savings))
            .is_none());
        assert_eq!(ledger.account("ALPHA").unwrap().name(), "Alpha");
        assert!(std::ptr::eq(
            ledger.account("alpha").unwrap(),
            ledger.account("Alpha").unwrap()
        ));

        let replaced = ledger.add_account(Account::new("alpha", AccountKind::Debit));
        assert_eq!(replaced.unwrap().kind(), AccountKind::Savings);
        assert_eq!(ledger.accounts().len(), 3);

        assert_eq!(ledger.remove_account("ALPHA").unwrap().kind(), AccountKind::Debit);
        assert!(matches!(
            ledger.remove_account("alpha"),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn consistency_check_flags_stray_dates() {
        let mut ledger = sample();
        let mut stray = Account::new("C", AccountKind::Savings);
        stray.set(ymd(2019, 5, 5), EntryValue::parse("1"));
        assert!(matches!(
            ledger.check_candidate(&stray),
            Err(LedgerError::InconsistentHistory { .. })
        ));
        ledger.add_account(stray);
        assert!(ledger.check_consistency().is_err());
    }

    #[test]
    fn set_value_requires_a_ledger_date() {
        let mut ledger = sample();
        let previous = ledger
            .set_value("a", ymd(2020, 1, 1), EntryValue::parse("150"))
            .unwrap();
        assert_eq!(previous, Some(EntryValue::parse("100")));
        assert!(ledger
            .set_value("A", ymd(2019, 1, 1), EntryValue::parse("1"))
            .is_err());
        assert!(ledger
            .set_value("nobody", ymd(2020, 1, 1), EntryValue::parse("1"))
            .is_err());
    }

    #[test]
    fn summary_counts_populated_entries_and_span() {
        let summary = sample().summary();
        assert_eq!(summary.account_count, 2);
        assert_eq!(summary.date_count, 2);
        assert_eq!(summary.populated, vec![("A".into(), 2), ("B".into(), 1)]);
        let span = summary.span.unwrap();
        assert_eq!(span.years, 1.0);
        assert!(summary
            .to_string()
            .ends_with("Dates span from 01-Jan-2020 to 01-Jan-2021. (1.00 years)"));

        assert!(Ledger::new().summary().span.is_none());
    }

    #[test]
    fn totals_sum_signed_numeric_entries() {
        let totals = sample().totals();
        assert_eq!(totals.name(), TOTALS_NAME);
        assert_eq!(
            totals.value_on(ymd(2020, 1, 1), false).as_decimal(),
            Some(Decimal::ZERO)
        );
        assert_eq!(
            totals.value_on(ymd(2021, 1, 1), false).as_decimal(),
            Some(Decimal::from(100))
        );
    }

    #[test]
    fn totals_overflow_leaves_the_date_empty() {
        let source = "Account,Type,01-Jan-2020,01-Jan-2021\n\
                      A,Savings,50000000000000000000000000000,1\n\
                      B,Savings,50000000000000000000000000000,2\n";
        let ledger = Ledger::load(source.as_bytes(), &resolver()).unwrap();
        let totals = ledger.totals();
        assert_eq!(totals.value_on(ymd(2020, 1, 1), false), EntryValue::Empty);
        assert_eq!(
            totals.value_on(ymd(2021, 1, 1), false).as_decimal(),
            Some(Decimal::from(3))
        );
    }

    #[test]
    fn merge_appends_dates_and_upserts_accounts() {
        let mut ledger = sample();
        let import = "Account,Type,01-Jan-2021,01-Jun-2021\n\
                      b,Credit,40,50\n\
                      C,Savings,,7\n";
        let other = Ledger::load(import.as_bytes(), &resolver()).unwrap();
        let report = ledger.merge(other).unwrap();

        assert_eq!(report.dates_added, 1);
        assert_eq!(report.accounts_added, 1);
        assert_eq!(report.values_updated, 2);
        assert_eq!(ledger.dates().len(), 3);
        assert_eq!(
            ledger.account("B").unwrap().value_on(ymd(2021, 1, 1), false),
            EntryValue::parse("40")
        );
        ledger.check_consistency().unwrap();

        let clash = Ledger::load("Account,Type\nA,Mortgage\n".as_bytes(), &resolver()).unwrap();
        assert!(matches!(
            ledger.merge(clash),
            Err(LedgerError::MalformedSource { line: 2, .. })
        ));
    }

    #[test]
    fn merge_clash_reports_the_source_row() {
        let mut ledger = sample();
        let import = "Account,Type,01-Jan-2021\n\
                      Z,Debit,\"two\nlines\"\n\
                      A,Mortgage,1\n";
        let other = Ledger::load(import.as_bytes(), &resolver()).unwrap();
        assert_eq!(other.account("A").unwrap().source_line(), Some(4));
        assert!(matches!(
            ledger.merge(other),
            Err(LedgerError::MalformedSource { line: 4, .. })
        ));
        assert!(!ledger.is_modified());
    }

    #[test]
    fn write_to_keeps_stored_date_order() {
        let mut ledger = sample();
        ledger
            .insert_date(ymd(2019, 1, 1), [("A", EntryValue::parse("5"))])
            .unwrap();
        let mut buffer = Vec::new();
        ledger.write_to(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("Account,Type,01-Jan-2020,01-Jan-2021,01-Jan-2019\n"));
        assert!(text.contains("B,Credit,100,,\n"));

        ledger.sort_dates();
        let mut buffer = Vec::new();
        ledger.write_to(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("Account,Type,01-Jan-2019,01-Jan-2020,01-Jan-2021\n"));
    }

    #[test]
    fn format_value_uses_currency_symbols() {
        assert_eq!(format_value(&EntryValue::parse("12.5"), "GBP"), "£12.5");
        assert_eq!(format_value(&EntryValue::parse("-3"), "USD"), "-$3");
        assert_eq!(format_value(&EntryValue::parse("3"), "JPY"), "3 JPY");
        assert_eq!(format_value(&EntryValue::Empty, "GBP"), "no data");
    }
}
