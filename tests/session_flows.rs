use balance_core::{
    cli::{EditOperation, EditSession, ReportSession, ScriptedInteraction},
    errors::CommandError,
    ledger::{DateResolver, EntryValue, FixedClock, Ledger},
};
use chrono::NaiveDate;

fn resolver() -> DateResolver {
    DateResolver::with_clock(FixedClock(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample() -> Ledger {
    let source = "Account,Type,01-Jan-2020,01-Jan-2021\nA,Current,100,150\nB,Credit,,20\n";
    Ledger::load(source.as_bytes(), &resolver()).unwrap()
}

#[test]
fn full_session_adds_a_date_and_removes_an_account() {
    let mut ledger = sample();
    let mut io = ScriptedInteraction::new([
        // menu: add a date
        "2",
        "01-Jan-2030",
        "01-07-21",
        "175",
        "n/a",
        "y",
        "y",
        // menu: remove an account, by label
        "remove an account",
        "b",
        "yes",
        "delete",
        "n",
    ]);
    let summary = EditSession::new(&mut ledger, &mut io, resolver())
        .run()
        .unwrap();

    assert_eq!(
        summary.committed,
        vec![EditOperation::AddDate, EditOperation::RemoveAccount]
    );
    assert!(io.saw("is in the future"));
    assert!(io.saw("Response 'yes' invalid"));
    assert_eq!(io.remaining(), 0);

    assert_eq!(ledger.dates().len(), 3);
    assert!(ledger.account("B").is_none());
    let a = ledger.account("A").unwrap();
    assert_eq!(a.entry(date(2021, 7, 1)), Some(&EntryValue::parse("175")));
    assert!(ledger.is_modified());
}

#[test]
fn cancel_at_destructive_gate_changes_nothing() {
    let mut ledger = sample();
    let before = ledger.full_report();
    let mut io = ScriptedInteraction::new(["4", "01-01-20", "cancel", "n"]);
    let summary = EditSession::new(&mut ledger, &mut io, resolver())
        .run()
        .unwrap();

    assert!(summary.committed.is_empty());
    assert_eq!(summary.abandoned, 1);
    assert!(io.saw("Reporting all bank accounts for 01-Jan-2020:"));
    assert_eq!(ledger.full_report(), before);
    assert!(!ledger.is_modified());
}

#[test]
fn cancel_when_removing_an_account_changes_nothing() {
    let mut ledger = sample();
    let before = ledger.full_report();
    let mut io = ScriptedInteraction::new(["3", "a", "y", "cancel", "n"]);
    let summary = EditSession::new(&mut ledger, &mut io, resolver())
        .run()
        .unwrap();

    assert!(summary.committed.is_empty());
    assert_eq!(summary.abandoned, 1);
    assert!(io.saw("Response 'y' invalid"));
    assert!(io.saw("Removal cancelled."));
    assert_eq!(ledger.accounts().len(), 2);
    assert_eq!(ledger.full_report(), before);
    assert!(!ledger.is_modified());
}

#[test]
fn duplicate_names_and_dates_are_rejected_at_the_prompt() {
    let mut ledger = sample();
    let mut io = ScriptedInteraction::new([
        "Add an account",
        "a",
        "Cash",
        "y",
        "debit",
        "5",
        "",
        "y",
        "y",
        "Add a date",
        "01-01-21",
    ]);
    let result = EditSession::new(&mut ledger, &mut io, resolver()).run();

    // The script runs out while the second operation is still collecting input.
    assert!(matches!(result, Err(CommandError::InputClosed)));
    assert!(io.saw("Account `a` already exists"));
    assert!(io.saw("Date 01-Jan-2021 is already tracked"));
    assert_eq!(ledger.account_names(), vec!["A", "B", "Cash"]);
    assert_eq!(ledger.dates().len(), 2);
    assert!(ledger.check_consistency().is_ok());
}

#[test]
fn report_session_walks_every_view() {
    let ledger = sample();
    let mut io = ScriptedInteraction::new([
        "3", "y", // full report
        "2", "01-Jan-21", "y", // single date
        "1", "Bee", "B", "n", // single account with a typo first
    ]);
    let shown = ReportSession::new(&ledger, &mut io, resolver())
        .run()
        .unwrap();

    assert_eq!(shown, 3);
    assert!(io.saw("Reporting all bank accounts for 01-Jan-2020:"));
    assert!(io.saw("Reporting all bank accounts for 01-Jan-2021:"));
    assert!(io.saw("Reporting B (Credit):"));
    assert!(io.saw("01-Jan-2020 - no data"));
}
