//! Interactive shell around the ledger: edit and report sessions plus the
//! command-line entry point.

pub mod app;
pub mod args;
pub mod edit;
pub mod interaction;
pub mod output;
pub mod prompts;
pub mod report;

pub use app::{run, run_with, save_on_exit, SaveOutcome};
pub use args::{Action, Args};
pub use edit::{EditOperation, EditOutcome, EditSession, EditSummary};
pub use interaction::{Interaction, ScriptedInteraction, TerminalInteraction};
pub use report::{ReportSession, ReportView};
