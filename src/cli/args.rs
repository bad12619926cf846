use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::errors::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Print the summary and every date report.
    Print,
    /// Interactively add, remove, or change entries.
    Edit,
    /// Interactively browse reports.
    Report,
    /// Merge another balance file into the ledger.
    #[value(name = "auto_update")]
    AutoUpdate,
}

impl Action {
    /// Whether the action can leave the ledger modified.
    pub fn mutates(self) -> bool {
        matches!(self, Action::Edit | Action::AutoUpdate)
    }
}

/// Track account balances across dates.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "balance_core_cli",
    version,
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("BALANCE_CORE_BUILD_HASH"),
        ", built ",
        env!("BALANCE_CORE_BUILD_DATE"),
        ")"
    ),
    about
)]
pub struct Args {
    /// What to do with the ledger.
    #[arg(short, long, value_enum)]
    pub action: Action,

    /// Balance file to import with `auto_update`.
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Ledger file to use instead of the configured one.
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Replace the ledger file on exit without asking.
    #[arg(long)]
    pub overwrite: bool,
}

impl Args {
    /// Cross-argument checks clap cannot express.
    pub fn validate(&self) -> Result<(), CommandError> {
        match (&self.action, &self.target) {
            (Action::AutoUpdate, None) => Err(CommandError::InvalidArguments(
                "--target is required with --action auto_update".into(),
            )),
            (Action::AutoUpdate, Some(target)) if !target.is_file() => {
                Err(CommandError::InvalidArguments(format!(
                    "target file {} does not exist",
                    target.display()
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snake_case_actions() {
        let args = Args::try_parse_from(["balance_core_cli", "-a", "auto_update", "-t", "x.csv"])
            .unwrap();
        assert_eq!(args.action, Action::AutoUpdate);
        assert!(args.action.mutates());
        assert_eq!(args.target, Some(PathBuf::from("x.csv")));
        assert!(!args.overwrite);
    }

    #[test]
    fn action_is_required() {
        assert!(Args::try_parse_from(["balance_core_cli"]).is_err());
        assert!(Args::try_parse_from(["balance_core_cli", "--action", "plot"]).is_err());
    }

    #[test]
    fn auto_update_needs_an_existing_target() {
        let args = Args::try_parse_from(["balance_core_cli", "--action", "auto_update"]).unwrap();
        assert!(matches!(
            args.validate(),
            Err(CommandError::InvalidArguments(_))
        ));

        let file = tempfile::NamedTempFile::new().unwrap();
        let target = file.path().to_string_lossy().to_string();
        let args = Args::try_parse_from([
            "balance_core_cli",
            "--action",
            "auto_update",
            "--target",
            target.as_str(),
        ])
        .unwrap();
        assert!(args.validate().is_ok());

        let args = Args::try_parse_from(["balance_core_cli", "--action", "print"]).unwrap();
        assert!(args.validate().is_ok());
    }
}
