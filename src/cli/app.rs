use std::env;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cli::args::{Action, Args};
use crate::cli::edit::EditSession;
use crate::cli::interaction::{Interaction, TerminalInteraction};
use crate::cli::output::{self, MessageKind, OutputPreferences};
use crate::cli::prompts::ask_yes_no;
use crate::cli::report::ReportSession;
use crate::config::{Config, ConfigManager};
use crate::errors::{CommandError, LedgerError};
use crate::ledger::{DateResolver, Ledger};
use crate::utils::{build_info, persistence};

/// What happened to the ledger file when the run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Unchanged,
    Saved(PathBuf),
    Discarded,
}

/// Entry point used by the binary: reads the configuration and talks to the terminal.
pub fn run(args: Args) -> Result<SaveOutcome, CommandError> {
    debug!(build = %build_info::current(), "starting");
    let manager = ConfigManager::new();
    let config = manager.load()?;
    output::set_preferences(OutputPreferences {
        quiet_mode: config.quiet,
        plain_mode: env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal(),
    });
    let data_file = args
        .data_file
        .clone()
        .unwrap_or_else(|| manager.data_file(&config));
    let mut io = TerminalInteraction::new();
    run_with(&args, &config, &data_file, &DateResolver::system(), &mut io)
}

/// Loads the ledger, performs `args.action`, and saves if anything changed.
///
/// A ledger file that fails to load ends the run before any save is attempted.
pub fn run_with<I: Interaction>(
    args: &Args,
    config: &Config,
    data_file: &Path,
    resolver: &DateResolver,
    io: &mut I,
) -> Result<SaveOutcome, CommandError> {
    args.validate()?;
    if persistence::ensure_template(data_file)? {
        io.say(
            MessageKind::Info,
            &format!("Created an empty ledger at {}", data_file.display()),
        );
    }
    let mut ledger =
        Ledger::load_with_currency(File::open(data_file)?, resolver, &config.currency)?;
    io.say(MessageKind::Plain, &ledger.summary().to_string());
    io.say(MessageKind::Separator, "");

    match args.action {
        Action::Print => {
            ReportSession::new(&ledger, &mut *io, resolver.clone()).full_report();
        }
        Action::Report => {
            let session = ReportSession::new(&ledger, &mut *io, resolver.clone());
            tolerate_closed_input(session.run())?;
        }
        Action::Edit => {
            let session = EditSession::new(&mut ledger, &mut *io, resolver.clone());
            if let Some(summary) = tolerate_closed_input(session.run())? {
                info!(
                    committed = summary.committed.len(),
                    abandoned = summary.abandoned,
                    "edit session finished"
                );
            }
        }
        Action::AutoUpdate => {
            let Some(target) = args.target.as_deref() else {
                return Err(CommandError::InvalidArguments(
                    "--target is required with --action auto_update".into(),
                ));
            };
            let incoming =
                Ledger::load_with_currency(File::open(target)?, resolver, &config.currency)?;
            let report = ledger.merge(incoming)?;
            io.say(
                MessageKind::Success,
                &format!(
                    "Imported {}: {} new dates, {} new accounts, {} values updated.",
                    target.display(),
                    report.dates_added,
                    report.accounts_added,
                    report.values_updated
                ),
            );
        }
    }

    if !args.action.mutates() {
        return Ok(SaveOutcome::Unchanged);
    }
    save_on_exit(
        &mut ledger,
        data_file,
        args.overwrite || !config.confirm_overwrite,
        io,
    )
}

fn tolerate_closed_input<T>(result: Result<T, CommandError>) -> Result<Option<T>, CommandError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CommandError::InputClosed) => {
            warn!("input closed during session");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Persists a modified ledger in chronological order.
///
/// A refused save asks before overwriting; closed input counts as "no".
pub fn save_on_exit<I: Interaction>(
    ledger: &mut Ledger,
    path: &Path,
    allow_overwrite: bool,
    io: &mut I,
) -> Result<SaveOutcome, CommandError> {
    if !ledger.is_modified() {
        return Ok(SaveOutcome::Unchanged);
    }
    ledger.sort_dates();
    match ledger.save(path, allow_overwrite) {
        Ok(()) => {}
        Err(LedgerError::SaveRefused(_)) => {
            let question = format!("Overwrite {}? (y/n): ", path.display());
            let confirmed = match ask_yes_no(io, &question) {
                Ok(answer) => answer,
                Err(CommandError::InputClosed) => false,
                Err(err) => return Err(err),
            };
            if !confirmed {
                io.say(MessageKind::Warning, "Changes were not saved.");
                return Ok(SaveOutcome::Discarded);
            }
            ledger.save(path, true)?;
        }
        Err(err) => return Err(err.into()),
    }
    io.say(
        MessageKind::Success,
        &format!("Saved ledger to {}", path.display()),
    );
    Ok(SaveOutcome::Saved(path.to_path_buf()))
}
