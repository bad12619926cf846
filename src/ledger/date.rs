//! Free-text date resolution.
//!
//! Input dates are matched against [`CHECK_DATE_FORMATS`] in order and the
//! first format that parses wins. The order is day-first, so `01-02-23` is
//! always 1 February 2023, never 2 January. Output always uses
//! [`OUTPUT_DATE_FORMAT`], regardless of how the date was typed.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::debug;

use crate::errors::{LedgerError, Result};

/// Accepted input formats, in priority order.
pub const CHECK_DATE_FORMATS: [&str; 3] = ["%d-%m-%y", "%d-%b-%y", "%d-%b-%Y"];

/// Canonical textual date format (e.g. `01-Jan-2020`).
pub const OUTPUT_DATE_FORMAT: &str = "%d-%b-%Y";

/// Clock abstracts access to the current date so resolution stays deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current calendar date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock; "today" is the operator's local calendar day.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parses operator and file dates, rejecting anything after today.
#[derive(Clone)]
pub struct DateResolver {
    clock: Arc<dyn Clock>,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for DateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateResolver")
            .field("today", &self.clock.today())
            .finish()
    }
}

impl DateResolver {
    pub fn system() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Resolves `text` using the first matching entry of [`CHECK_DATE_FORMATS`].
    pub fn resolve(&self, text: &str) -> Result<NaiveDate> {
        let trimmed = text.trim();
        let (date, format) = CHECK_DATE_FORMATS
            .iter()
            .find_map(|format| {
                NaiveDate::parse_from_str(trimmed, format)
                    .ok()
                    .map(|date| (date, *format))
            })
            .ok_or_else(|| LedgerError::InvalidDateFormat(trimmed.to_string()))?;
        debug!(input = trimmed, format, %date, "resolved date");

        self.ensure_not_future(date)
    }

    /// Accepts an already-parsed date as long as it is not after today.
    pub fn ensure_not_future(&self, date: NaiveDate) -> Result<NaiveDate> {
        if date > self.clock.today() {
            return Err(LedgerError::FutureDate(date));
        }
        Ok(date)
    }
}

/// Renders a date in the canonical output format.
pub fn canonical(date: NaiveDate) -> String {
    date.format(OUTPUT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolver() -> DateResolver {
        DateResolver::with_clock(FixedClock(ymd(2024, 6, 15)))
    }

    #[test]
    fn ambiguous_numeric_dates_are_day_first() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("01-02-23").unwrap(), ymd(2023, 2, 1));
        assert_eq!(resolver.resolve("01-02-23").unwrap(), ymd(2023, 2, 1));
    }

    #[test]
    fn month_name_formats_resolve() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("05-Mar-21").unwrap(), ymd(2021, 3, 5));
        assert_eq!(resolver.resolve("01-Jan-2020").unwrap(), ymd(2020, 1, 1));
        assert_eq!(resolver.resolve("  01-Jan-2020 ").unwrap(), ymd(2020, 1, 1));
    }

    #[test]
    fn unknown_formats_are_rejected() {
        let resolver = resolver();
        for input in ["2020-01-01", "01/01/2020", "yesterday", "", "01-02-2023"] {
            assert!(
                matches!(resolver.resolve(input), Err(LedgerError::InvalidDateFormat(_))),
                "`{input}` should not parse"
            );
        }
    }

    #[test]
    fn today_is_accepted_and_tomorrow_is_not() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("15-Jun-2024").unwrap(), ymd(2024, 6, 15));
        assert!(matches!(
            resolver.resolve("16-Jun-2024"),
            Err(LedgerError::FutureDate(date)) if date == ymd(2024, 6, 16)
        ));
    }

    #[test]
    fn canonical_output_is_independent_of_input_format() {
        let resolver = resolver();
        let typed = resolver.resolve("07-08-19").unwrap();
        assert_eq!(canonical(typed), "07-Aug-2019");
    }
}
