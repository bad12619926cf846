use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

use dialoguer::{theme::ColorfulTheme, Input};

use crate::cli::output::{self, MessageKind};
use crate::errors::CommandError;

/// Source of operator answers and sink for session messages.
///
/// Sessions only talk to the operator through this trait, so they can be
/// driven from a terminal, a pipe, or a scripted queue in tests.
pub trait Interaction {
    /// Reads one line of input. Fails with [`CommandError::InputClosed`] once input is exhausted.
    fn ask(&mut self, question: &str) -> Result<String, CommandError>;

    fn say(&mut self, kind: MessageKind, message: &str);
}

/// Terminal-backed interaction.
///
/// Uses dialoguer prompts on a TTY and falls back to plain line reads when
/// stdin is piped.
pub struct TerminalInteraction {
    theme: ColorfulTheme,
    interactive: bool,
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            interactive: io::stdin().is_terminal(),
        }
    }

    fn read_line(&self, question: &str) -> Result<String, CommandError> {
        print!("{question}");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(CommandError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction for TerminalInteraction {
    fn ask(&mut self, question: &str) -> Result<String, CommandError> {
        if !self.interactive {
            return self.read_line(question);
        }
        Input::<String>::with_theme(&self.theme)
            .with_prompt(question.trim_end().trim_end_matches(':'))
            .allow_empty(true)
            .interact_text()
            .map_err(|err| match err {
                dialoguer::Error::IO(io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
                    CommandError::InputClosed
                }
                other => CommandError::from(other),
            })
    }

    fn say(&mut self, kind: MessageKind, message: &str) {
        output::print(kind, message);
    }
}

/// Queue-driven interaction that records everything it was asked and told.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedInteraction {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Whether any transcript line contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Interaction for ScriptedInteraction {
    fn ask(&mut self, question: &str) -> Result<String, CommandError> {
        let answer = self.answers.pop_front().ok_or(CommandError::InputClosed)?;
        self.transcript.push(format!("{question}{answer}"));
        Ok(answer)
    }

    fn say(&mut self, kind: MessageKind, message: &str) {
        self.transcript.push(output::format_message(kind, message));
    }
}
