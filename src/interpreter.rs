//! The read-validate-record-dispatch loop.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::builtin::Dispatcher;
use crate::parser::validate;
use crate::prompt::build_prompt;
use crate::session::Session;

/// What became of one evaluated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The line failed syntax validation and was discarded.
    Rejected,
    /// The line named a builtin, which has run.
    Builtin,
    /// The line is valid but names no builtin; running it is the execution
    /// collaborator's job, which this crate deliberately does not implement.
    External,
}

/// The interpreter front end: owns the session state and evaluates one line
/// at a time.
pub struct Interpreter {
    session: Session,
    dispatcher: Dispatcher,
}

impl Interpreter {
    /// See [`Session::new`] for how `home` is resolved.
    pub fn new(home: Option<PathBuf>) -> Self {
        Interpreter {
            session: Session::new(home),
            dispatcher: Dispatcher::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Evaluate one already-trimmed, non-empty line: validate, record into
    /// history, dispatch. All user-visible output goes to `out`.
    pub fn eval(&mut self, line: &str, out: &mut dyn Write) -> Result<Outcome> {
        if !validate(line) {
            writeln!(out, "Invalid Syntax!")?;
            return Ok(Outcome::Rejected);
        }

        // Recording failures are non-fatal and invisible; the interpreter
        // proceeds without history.
        let _ = self.session.history().append(line);

        if self.dispatch(line, out)? {
            return Ok(Outcome::Builtin);
        }
        Ok(Outcome::External)
    }

    /// Dispatch a line already known to be valid. Returns whether its leading
    /// word named a builtin, in which case the builtin's output and side
    /// effects have already happened.
    pub fn dispatch(&mut self, line: &str, out: &mut dyn Write) -> Result<bool> {
        self.dispatcher.dispatch(line, &mut self.session, out)
    }

    /// Interactive loop: prompt, read, evaluate, repeat until end-of-input.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        let mut stdout = io::stdout();

        loop {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("?"));
            let prompt = format!("{} ", build_prompt(self.session.home(), &cwd));
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line)?;
                    self.eval(line, &mut stdout)?;
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}
