use crate::cli::interaction::Interaction;
use crate::cli::output::MessageKind;
use crate::cli::prompts::{ask_menu, ask_until, ask_yes_no, select_ledger_date, select_report_account};
use crate::errors::CommandError;
use crate::ledger::{canonical, format_value, Account, DateResolver, Ledger, TOTALS_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportView {
    Account,
    Date,
    Full,
}

impl ReportView {
    pub const ALL: [ReportView; 3] = [ReportView::Account, ReportView::Date, ReportView::Full];

    pub fn label(self) -> &'static str {
        match self {
            ReportView::Account => "Single account",
            ReportView::Date => "Single date",
            ReportView::Full => "Full report",
        }
    }
}

/// Read-only report menu over a ledger.
pub struct ReportSession<'a, I: Interaction> {
    ledger: &'a Ledger,
    io: &'a mut I,
    resolver: DateResolver,
}

impl<'a, I: Interaction> ReportSession<'a, I> {
    pub fn new(ledger: &'a Ledger, io: &'a mut I, resolver: DateResolver) -> Self {
        Self {
            ledger,
            io,
            resolver,
        }
    }

    /// Shows reports until the operator asks for no more. Returns how many were shown.
    pub fn run(mut self) -> Result<usize, CommandError> {
        let options: Vec<(ReportView, &str)> = ReportView::ALL
            .iter()
            .map(|view| (*view, view.label()))
            .collect();
        let mut shown = 0;
        loop {
            let view = ask_menu(self.io, "Which report would you like?", &options)?;
            self.show(view)?;
            shown += 1;
            if !ask_yes_no(self.io, "Do you want another report? (y/n): ")? {
                return Ok(shown);
            }
        }
    }

    pub fn show(&mut self, view: ReportView) -> Result<(), CommandError> {
        match view {
            ReportView::Account => self.account_report(),
            ReportView::Date => self.date_report(),
            ReportView::Full => {
                self.full_report();
                Ok(())
            }
        }
    }

    /// Every date in stored order.
    pub fn full_report(&mut self) {
        if self.ledger.dates().is_empty() {
            self.io.say(MessageKind::Warning, "No dates recorded yet.");
            return;
        }
        for report in self.ledger.full_report() {
            self.io.say(MessageKind::Plain, &report.to_string());
        }
    }

    fn date_report(&mut self) -> Result<(), CommandError> {
        if self.ledger.dates().is_empty() {
            self.io.say(MessageKind::Warning, "No dates recorded yet.");
            return Ok(());
        }
        let (ledger, resolver) = (self.ledger, &self.resolver);
        let date = ask_until(self.io, "Which date would you like to report on?: ", |raw| {
            select_ledger_date(ledger, resolver, raw)
        })?;
        self.io
            .say(MessageKind::Plain, &self.ledger.report_on(date).to_string());
        Ok(())
    }

    fn account_report(&mut self) -> Result<(), CommandError> {
        let ledger = self.ledger;
        let name = ask_until(
            self.io,
            &format!("Which account would you like to report on? (or '{TOTALS_NAME}'): "),
            |raw| select_report_account(ledger, raw),
        )?;
        let totals;
        let account: &Account = if name == TOTALS_NAME {
            totals = ledger.totals();
            &totals
        } else {
            match ledger.account(&name) {
                Some(account) => account,
                None => return Ok(()),
            }
        };

        self.io.say(
            MessageKind::Plain,
            &format!("Reporting {} ({}):", account.name(), account.kind()),
        );
        for date in ledger.dates() {
            let value = account.value_on(*date, false);
            self.io.say(
                MessageKind::Plain,
                &format!(
                    "    {} - {}",
                    canonical(*date),
                    format_value(&value, account.currency())
                ),
            );
        }
        Ok(())
    }
}
