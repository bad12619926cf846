//! Retry and confirmation loops shared by the edit and report sessions.

use std::fmt;

use chrono::NaiveDate;

use crate::cli::interaction::Interaction;
use crate::cli::output::MessageKind;
use crate::errors::{CommandError, LedgerError};
use crate::ledger::{canonical, names_match, DateResolver, Ledger, TOTALS_NAME};

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Re-asks `question` until `parse` accepts the answer.
///
/// Rejections are reported to the operator and never end the loop; only
/// closed input does.
pub fn ask_until<I, T, E, F>(io: &mut I, question: &str, mut parse: F) -> Result<T, CommandError>
where
    I: Interaction + ?Sized,
    E: fmt::Display,
    F: FnMut(&str) -> Result<T, E>,
{
    loop {
        let answer = io.ask(question)?;
        match parse(answer.trim()) {
            Ok(value) => return Ok(value),
            Err(reason) => io.say(MessageKind::Warning, &format!("{reason}. Please try again.")),
        }
    }
}

/// Accepts one of `answers`, case-insensitively, returning the listed spelling.
pub fn ask_choice<I>(io: &mut I, question: &str, answers: &[&str]) -> Result<String, CommandError>
where
    I: Interaction + ?Sized,
{
    ask_until(io, question, |raw| {
        answers
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(raw))
            .map(|candidate| candidate.to_string())
            .ok_or_else(|| {
                format!(
                    "Response '{raw}' invalid, expected one of: {}",
                    answers.join(", ")
                )
            })
    })
}

pub fn ask_yes_no<I>(io: &mut I, question: &str) -> Result<bool, CommandError>
where
    I: Interaction + ?Sized,
{
    Ok(ask_choice(io, question, &["y", "n"])? == "y")
}

/// Asks for a value, echoes the raw answer, and repeats until the operator agrees it is right.
pub fn ask_double_checked<I, T, E, F>(
    io: &mut I,
    question: &str,
    mut parse: F,
) -> Result<T, CommandError>
where
    I: Interaction + ?Sized,
    E: fmt::Display,
    F: FnMut(&str) -> Result<T, E>,
{
    loop {
        let mut raw = String::new();
        let value = ask_until(io, question, |answer| {
            raw = answer.to_string();
            parse(answer)
        })?;
        io.say(MessageKind::Info, &format!("You have entered: {raw}"));
        if ask_yes_no(io, "Is that correct? (y/n): ")? {
            return Ok(value);
        }
    }
}

/// Gate for destructive changes: only the exact `token` proceeds, `cancel` backs out.
pub fn confirm_destructive<I>(io: &mut I, token: &str) -> Result<bool, CommandError>
where
    I: Interaction + ?Sized,
{
    let question = format!("Type '{token}' to confirm or 'cancel' to abort: ");
    Ok(ask_choice(io, &question, &[token, "cancel"])? == token)
}

/// Numbered menu; accepts either the position or the label.
pub fn ask_menu<I, T>(io: &mut I, title: &str, options: &[(T, &str)]) -> Result<T, CommandError>
where
    I: Interaction + ?Sized,
    T: Copy,
{
    io.say(MessageKind::Section, title);
    for (index, (_, label)) in options.iter().enumerate() {
        io.say(MessageKind::Plain, &format!("  {}. {label}", index + 1));
    }
    ask_until(io, "Select an option: ", |raw| {
        let by_number = raw
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| options.get(index));
        by_number
            .or_else(|| {
                options
                    .iter()
                    .find(|(_, label)| label.eq_ignore_ascii_case(raw))
            })
            .map(|(value, _)| *value)
            .ok_or_else(|| format!("Value '{raw}' is not one of the listed options"))
    })
}

/// Resolves `raw` to the stored name of an account, suggesting a close match on failure.
pub fn select_account(ledger: &Ledger, raw: &str) -> Result<String, LedgerError> {
    ledger
        .account(raw)
        .map(|account| account.name().to_string())
        .ok_or_else(|| not_found_with_hint(raw, ledger.account_names()))
}

/// Like [`select_account`] but also accepts the totals pseudo-account.
pub fn select_report_account(ledger: &Ledger, raw: &str) -> Result<String, LedgerError> {
    if names_match(TOTALS_NAME, raw) {
        return Ok(TOTALS_NAME.to_string());
    }
    let mut names = ledger.account_names();
    names.push(TOTALS_NAME);
    ledger
        .account(raw)
        .map(|account| account.name().to_string())
        .ok_or_else(|| not_found_with_hint(raw, names))
}

/// Resolves `raw` to a date already on the ledger's axis.
pub fn select_ledger_date(
    ledger: &Ledger,
    resolver: &DateResolver,
    raw: &str,
) -> Result<NaiveDate, LedgerError> {
    let date = resolver.resolve(raw)?;
    if ledger.has_date(date) {
        Ok(date)
    } else {
        Err(LedgerError::NotFound(format!(
            "date {} is not in the ledger",
            canonical(date)
        )))
    }
}

fn not_found_with_hint<'a>(raw: &str, names: impl IntoIterator<Item = &'a str>) -> LedgerError {
    let needle = raw.to_lowercase();
    let best = names
        .into_iter()
        .map(|name| (strsim::jaro_winkler(&needle, &name.to_lowercase()), name))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|left, right| left.0.total_cmp(&right.0));
    match best {
        Some((_, name)) => LedgerError::NotFound(format!("account `{raw}`, did you mean `{name}`?")),
        None => LedgerError::NotFound(format!("account `{raw}`")),
    }
}
