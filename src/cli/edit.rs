use std::convert::Infallible;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::cli::interaction::Interaction;
use crate::cli::output::MessageKind;
use crate::cli::prompts::{
    ask_double_checked, ask_menu, ask_until, ask_yes_no, confirm_destructive, select_account,
    select_ledger_date,
};
use crate::errors::{CommandError, LedgerError};
use crate::ledger::{
    canonical, format_value, names_match, Account, AccountKind, DateResolver, EntryValue, Ledger,
    TOTALS_NAME,
};

/// Mutations offered by the edit menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOperation {
    AddAccount,
    AddDate,
    RemoveAccount,
    RemoveDate,
    EditValue,
}

impl EditOperation {
    pub const ALL: [EditOperation; 5] = [
        EditOperation::AddAccount,
        EditOperation::AddDate,
        EditOperation::RemoveAccount,
        EditOperation::RemoveDate,
        EditOperation::EditValue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EditOperation::AddAccount => "Add an account",
            EditOperation::AddDate => "Add a date",
            EditOperation::RemoveAccount => "Remove an account",
            EditOperation::RemoveDate => "Remove a date",
            EditOperation::EditValue => "Edit a single value",
        }
    }

    /// Destructive operations are gated by a typed confirmation token.
    pub fn confirm_token(self) -> Option<&'static str> {
        match self {
            EditOperation::RemoveAccount | EditOperation::RemoveDate => Some("delete"),
            EditOperation::EditValue => Some("overwrite"),
            EditOperation::AddAccount | EditOperation::AddDate => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Committed,
    Abandoned,
}

/// Counters for a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSummary {
    pub committed: Vec<EditOperation>,
    pub abandoned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditState {
    MenuRoot,
    InProgress(EditOperation),
    AskContinue,
    Finished,
}

/// Menu-driven editor over a borrowed ledger.
///
/// Each operation collects and validates all of its input first and touches
/// the ledger only after the operator confirms, so abandoning at any prompt
/// leaves the ledger as it was.
pub struct EditSession<'a, I: Interaction> {
    ledger: &'a mut Ledger,
    io: &'a mut I,
    resolver: DateResolver,
    state: EditState,
}

impl<'a, I: Interaction> EditSession<'a, I> {
    pub fn new(ledger: &'a mut Ledger, io: &'a mut I, resolver: DateResolver) -> Self {
        Self {
            ledger,
            io,
            resolver,
            state: EditState::MenuRoot,
        }
    }

    /// Runs menu rounds until the operator declines to make further edits.
    ///
    /// Closed input aborts the operation in progress and is returned as
    /// [`CommandError::InputClosed`]; edits committed before that stay applied.
    pub fn run(mut self) -> Result<EditSummary, CommandError> {
        let mut summary = EditSummary::default();
        loop {
            self.state = match self.state {
                EditState::MenuRoot => EditState::InProgress(self.choose()?),
                EditState::InProgress(operation) => {
                    match self.perform(operation)? {
                        EditOutcome::Committed => summary.committed.push(operation),
                        EditOutcome::Abandoned => summary.abandoned += 1,
                    }
                    EditState::AskContinue
                }
                EditState::AskContinue => {
                    if ask_yes_no(self.io, "Do you want to make any other edits? (y/n): ")? {
                        EditState::MenuRoot
                    } else {
                        EditState::Finished
                    }
                }
                EditState::Finished => return Ok(summary),
            };
        }
    }

    fn choose(&mut self) -> Result<EditOperation, CommandError> {
        let options: Vec<(EditOperation, &str)> = EditOperation::ALL
            .iter()
            .map(|operation| (*operation, operation.label()))
            .collect();
        ask_menu(self.io, "What would you like to edit?", &options)
    }

    /// Runs a single operation to completion or abandonment.
    pub fn perform(&mut self, operation: EditOperation) -> Result<EditOutcome, CommandError> {
        debug!(?operation, "edit operation started");
        self.io.say(MessageKind::Section, operation.label());
        let outcome = match operation {
            EditOperation::AddAccount => add_account(self.io, self.ledger, &self.resolver),
            EditOperation::AddDate => add_date(self.io, self.ledger, &self.resolver),
            EditOperation::RemoveAccount => remove_account(self.io, self.ledger),
            EditOperation::RemoveDate => remove_date(self.io, self.ledger, &self.resolver),
            EditOperation::EditValue => edit_value(self.io, self.ledger, &self.resolver),
        }?;
        info!(?operation, ?outcome, "edit operation finished");
        Ok(outcome)
    }
}

fn parse_balance(raw: &str) -> Result<EntryValue, String> {
    match EntryValue::parse(raw) {
        EntryValue::Text(text) => Err(format!("'{text}' is not a number")),
        value => Ok(value),
    }
}

fn parse_any(raw: &str) -> Result<EntryValue, Infallible> {
    Ok(EntryValue::parse(raw))
}

fn show_account<I: Interaction + ?Sized>(io: &mut I, account: &Account) {
    io.say(
        MessageKind::Plain,
        &format!("{} ({}, {}):", account.name(), account.kind(), account.currency()),
    );
    for (date, value) in account.describe() {
        io.say(
            MessageKind::Plain,
            &format!("    {date} : {}", format_value(value, account.currency())),
        );
    }
}

/// Final confirmation before `operation` touches the ledger.
///
/// Destructive operations need their typed token; the rest take a plain yes/no.
fn confirm_commit<I: Interaction + ?Sized>(
    io: &mut I,
    operation: EditOperation,
) -> Result<bool, CommandError> {
    match operation.confirm_token() {
        Some(token) => confirm_destructive(io, token),
        None => ask_yes_no(io, "Are the above details correct? (y/n): "),
    }
}

enum Review {
    Commit,
    Retry,
    Abandon,
}

fn review<I: Interaction + ?Sized>(
    io: &mut I,
    operation: EditOperation,
) -> Result<Review, CommandError> {
    if confirm_commit(io, operation)? {
        return Ok(Review::Commit);
    }
    if ask_yes_no(io, "Do you want to re-enter the details? (y/n): ")? {
        Ok(Review::Retry)
    } else {
        io.say(MessageKind::Warning, "Nothing was changed.");
        Ok(Review::Abandon)
    }
}

fn add_account<I: Interaction + ?Sized>(
    io: &mut I,
    ledger: &mut Ledger,
    resolver: &DateResolver,
) -> Result<EditOutcome, CommandError> {
    let operation = EditOperation::AddAccount;
    loop {
        let name = ask_double_checked(io, "What is the name of the account to add?: ", |raw| {
            if raw.is_empty() {
                Err("Account name cannot be blank".to_string())
            } else if names_match(raw, TOTALS_NAME) {
                Err(format!("'{TOTALS_NAME}' is reserved for the totals report"))
            } else if ledger.account(raw).is_some() {
                Err(LedgerError::DuplicateAccount(raw.to_string()).to_string())
            } else {
                Ok(raw.to_string())
            }
        })?;
        let kind = ask_until(
            io,
            "What type of account is it? (Current, Debit, Savings, Credit, Mortgage): ",
            |raw| raw.parse::<AccountKind>(),
        )?;

        let mut account = Account::with_currency(&name, kind, ledger.currency());
        for date in ledger.dates().to_vec() {
            let question = format!(
                "What was the value of {name} on {}? (blank if not active): ",
                canonical(date)
            );
            let value = ask_until(io, &question, parse_balance)?;
            account.add_entry_with(resolver, value, date)?;
        }

        io.say(MessageKind::Info, "Please check the details:");
        show_account(io, &account);
        match review(io, operation)? {
            Review::Commit => {
                ledger.check_candidate(&account)?;
                ledger.add_account(account);
                io.say(MessageKind::Success, &format!("Account '{name}' added."));
                return Ok(EditOutcome::Committed);
            }
            Review::Retry => continue,
            Review::Abandon => return Ok(EditOutcome::Abandoned),
        }
    }
}

fn add_date<I: Interaction + ?Sized>(
    io: &mut I,
    ledger: &mut Ledger,
    resolver: &DateResolver,
) -> Result<EditOutcome, CommandError> {
    let operation = EditOperation::AddDate;
    loop {
        let date = ask_until(
            io,
            "What date should be added? (DD-MM-YY, DD-Mon-YY or DD-Mon-YYYY): ",
            |raw| -> Result<NaiveDate, LedgerError> {
                let date = resolver.resolve(raw)?;
                if ledger.has_date(date) {
                    return Err(LedgerError::DuplicateDate(date));
                }
                Ok(date)
            },
        )?;

        let names: Vec<String> = ledger.account_names().into_iter().map(String::from).collect();
        let mut values = Vec::with_capacity(names.len());
        for name in &names {
            let question = format!("What was the value of {name} on {}?: ", canonical(date));
            values.push(ask_until(io, &question, parse_any)?);
        }

        io.say(
            MessageKind::Info,
            &format!("Values to record on {}:", canonical(date)),
        );
        for (name, value) in names.iter().zip(&values) {
            io.say(
                MessageKind::Plain,
                &format!("    {name} : {}", format_value(value, ledger.currency())),
            );
        }
        match review(io, operation)? {
            Review::Commit => {
                ledger.insert_date(date, names.iter().map(String::as_str).zip(values))?;
                io.say(
                    MessageKind::Success,
                    &format!("Date {} added.", canonical(date)),
                );
                return Ok(EditOutcome::Committed);
            }
            Review::Retry => continue,
            Review::Abandon => return Ok(EditOutcome::Abandoned),
        }
    }
}

fn remove_account<I: Interaction + ?Sized>(
    io: &mut I,
    ledger: &mut Ledger,
) -> Result<EditOutcome, CommandError> {
    if ledger.accounts().is_empty() {
        io.say(MessageKind::Warning, "There are no accounts to remove.");
        return Ok(EditOutcome::Abandoned);
    }
    let name = ask_until(io, "Which account should be removed?: ", |raw| {
        select_account(ledger, raw)
    })?;
    if let Some(account) = ledger.account(&name) {
        show_account(io, account);
    }
    if !confirm_commit(io, EditOperation::RemoveAccount)? {
        io.say(MessageKind::Warning, "Removal cancelled.");
        return Ok(EditOutcome::Abandoned);
    }
    ledger.remove_account(&name)?;
    io.say(MessageKind::Success, &format!("Account '{name}' removed."));
    Ok(EditOutcome::Committed)
}

fn remove_date<I: Interaction + ?Sized>(
    io: &mut I,
    ledger: &mut Ledger,
    resolver: &DateResolver,
) -> Result<EditOutcome, CommandError> {
    if ledger.dates().is_empty() {
        io.say(MessageKind::Warning, "There are no dates to remove.");
        return Ok(EditOutcome::Abandoned);
    }
    let date = ask_until(io, "Which date should be removed?: ", |raw| {
        select_ledger_date(ledger, resolver, raw)
    })?;
    io.say(MessageKind::Plain, &ledger.report_on(date).to_string());
    if !confirm_commit(io, EditOperation::RemoveDate)? {
        io.say(MessageKind::Warning, "Removal cancelled.");
        return Ok(EditOutcome::Abandoned);
    }
    ledger.remove_date(date)?;
    io.say(
        MessageKind::Success,
        &format!("Date {} removed.", canonical(date)),
    );
    Ok(EditOutcome::Committed)
}

fn edit_value<I: Interaction + ?Sized>(
    io: &mut I,
    ledger: &mut Ledger,
    resolver: &DateResolver,
) -> Result<EditOutcome, CommandError> {
    if ledger.accounts().is_empty() {
        io.say(MessageKind::Warning, "There are no accounts to edit.");
        return Ok(EditOutcome::Abandoned);
    }
    let name = ask_until(io, "Which account should be edited?: ", |raw| {
        select_account(ledger, raw)
    })?;
    let account = ledger
        .account(&name)
        .ok_or_else(|| LedgerError::NotFound(format!("account `{name}`")))?;
    if account.entries().next().is_none() {
        io.say(
            MessageKind::Warning,
            &format!("Account '{name}' has no entries to edit."),
        );
        return Ok(EditOutcome::Abandoned);
    }
    show_account(io, account);

    let date = ask_until(io, "Which date should be edited?: ", |raw| {
        let date = resolver.resolve(raw)?;
        if account.has_entry(date) {
            Ok(date)
        } else {
            Err(LedgerError::NotFound(format!(
                "entry for {name} on {}",
                canonical(date)
            )))
        }
    })?;
    let currency = account.currency().to_string();
    let previous = account.value_on(date, false);

    let value = ask_until(io, "What is the new value?: ", parse_any)?;
    io.say(
        MessageKind::Info,
        &format!(
            "{name} on {}: {} -> {}",
            canonical(date),
            format_value(&previous, &currency),
            format_value(&value, &currency)
        ),
    );
    if !confirm_commit(io, EditOperation::EditValue)? {
        io.say(MessageKind::Warning, "Edit cancelled.");
        return Ok(EditOutcome::Abandoned);
    }
    ledger.set_value(&name, date, value)?;
    io.say(MessageKind::Success, "Value updated.");
    Ok(EditOutcome::Committed)
}
