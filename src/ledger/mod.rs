//! Balance-history model: accounts, the shared date axis, and read-only views.

pub mod account;
pub mod date;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod series;

pub use account::{names_match, Account, AccountKind, DateInput, EntryValue, DEFAULT_CURRENCY};
pub use date::{canonical, Clock, DateResolver, FixedClock, SystemClock, OUTPUT_DATE_FORMAT};
pub use ledger::{
    format_value, DateReport, DateReportRow, DateSpan, Ledger, LedgerSummary, MergeReport,
    TOTALS_NAME,
};
pub use series::{build_all_series, build_series, Panel, Series};
