//! Line-oriented interactive shell.
//!
//! Plain lines are submitted for extraction; lines starting with `/` are
//! commands. Reads from any [`BufRead`] and renders to any [`Write`] so the
//! whole loop can be driven from tests.

use std::io::{BufRead, Write};

use anyhow::Context;

use crate::extract::{ExtractOutcome, Strategy};
use crate::providers::LlmProvider;
use crate::session::Session;
use crate::store::RecordLog;

const HELP: &str = "\
Type a message containing your name, email and phone number.
Commands:
  /mode [json-schema|function-calling]  show or switch the extraction method
  /history                              show the conversation history
  /clear                                clear the conversation history
  /help                                 show this help
  /quit                                 leave the shell";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text to extract from.
    Submit(String),
    /// Show (`None`) or switch the strategy.
    Mode(Option<Strategy>),
    /// Print the transcript.
    History,
    /// Clear the transcript.
    Clear,
    /// Print usage.
    Help,
    /// End the session.
    Quit,
    /// Unrecognized or malformed command, with an explanation.
    Invalid(String),
}

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Submit(line.trim_end_matches(['\r', '\n']).to_owned());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "mode" if arg.is_empty() => Self::Mode(None),
            "mode" => match arg.parse() {
                Ok(strategy) => Self::Mode(Some(strategy)),
                Err(e) => Self::Invalid(e),
            },
            "history" => Self::History,
            "clear" => Self::Clear,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command '/{other}', try /help")),
        }
    }
}

/// Interactive front end over a [`Session`].
pub struct Shell<'a> {
    provider: &'a dyn LlmProvider,
    sink: RecordLog,
    session: Session,
}

impl<'a> Shell<'a> {
    /// Shell bound to a provider, a record log and a fresh session.
    pub fn new(provider: &'a dyn LlmProvider, sink: RecordLog, session: Session) -> Self {
        Self {
            provider,
            sink,
            session,
        }
    }

    /// The underlying session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until `/quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only when reading input or writing output fails.
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut out: W,
    ) -> anyhow::Result<()> {
        writeln!(out, "JSON Extractor ({})", self.session.strategy().label())?;
        writeln!(out, "Type /help for commands.")?;

        let mut line = String::new();
        loop {
            write!(out, "[{}]> ", self.session.strategy())?;
            out.flush()?;

            line.clear();
            let read = input.read_line(&mut line).context("failed to read input")?;
            if read == 0 {
                writeln!(out)?;
                break;
            }

            if !self.handle(Command::parse(&line), &mut out).await? {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command; returns `false` when the shell should exit.
    ///
    /// # Errors
    ///
    /// Returns an error if writing output fails.
    pub async fn handle<W: Write>(
        &mut self,
        command: Command,
        out: &mut W,
    ) -> anyhow::Result<bool> {
        match command {
            Command::Submit(text) => {
                let submitted = self.session.submit(self.provider, &self.sink, &text).await;
                if let Some(outcome) = submitted {
                    render_outcome(&outcome, out)?;
                }
            }
            Command::Mode(None) => {
                writeln!(out, "Current method: {}", self.session.strategy().label())?;
            }
            Command::Mode(Some(strategy)) => {
                self.session.set_strategy(strategy);
                writeln!(out, "Switched to {} method.", strategy.label())?;
            }
            Command::History => render_history(&self.session, out)?,
            Command::Clear => {
                self.session.clear_history();
                writeln!(out, "Conversation history cleared.")?;
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
            Command::Invalid(reason) => writeln!(out, "error: {reason}")?,
        }
        Ok(true)
    }
}

/// Render a success record or an error line.
///
/// # Errors
///
/// Returns an error if writing output or serializing the record fails.
pub fn render_outcome<W: Write>(outcome: &ExtractOutcome, out: &mut W) -> anyhow::Result<()> {
    match outcome {
        ExtractOutcome::Success(record) => {
            writeln!(out, "Answer:")?;
            writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
            writeln!(out, "Data successfully extracted and stored.")?;
        }
        ExtractOutcome::Failure { message, .. } => writeln!(out, "error: {message}")?,
    }
    Ok(())
}

fn render_history<W: Write>(session: &Session, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "Conversation History")?;
    if session.history().is_empty() {
        writeln!(out, "No conversation history available.")?;
        return Ok(());
    }
    for turn in session.history().turns() {
        writeln!(out, "[{}] {}", turn.at.format("%H:%M:%S"), turn.render())?;
    }
    Ok(())
}
