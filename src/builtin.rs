//! Built-in commands and their dispatcher.
//!
//! Three verbs are handled inside the interpreter: `hop` (directory
//! navigation), `reveal` (directory listing) and `log` (history inspection).
//! Anything else is not a builtin and is left to the execution collaborator.
//!
//! Builtins receive the argument tokens that followed the verb, the mutable
//! [`Session`], and an output stream. All user-visible failures are written
//! to the stream as fixed messages and never abort the interpreter loop;
//! `Err` from [`Builtin::run`] is reserved for failures of the stream itself.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::history::INSPECTION_VERB;
use crate::lexer::{Token, tokenize};
use crate::session::Session;

/// User-visible builtin failures. The `Display` strings are part of the
/// shell's observable contract and must not change.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum BuiltinError {
    #[error("No such directory!")]
    NoSuchDirectory,
    #[error("reveal: Invalid Syntax!")]
    RevealUsage,
    #[error("log: Invalid Syntax!")]
    LogUsage,
}

/// A verb handled entirely inside the interpreter.
pub(crate) trait Builtin {
    /// Canonical name of the verb, e.g. "hop".
    fn name(&self) -> &'static str;

    /// Execute against the argument tokens that followed the verb.
    fn run(&self, args: &[Token], session: &mut Session, out: &mut dyn Write) -> Result<()>;
}

/// Recognizes builtin verbs by the leading word of a validated line.
pub(crate) struct Dispatcher {
    builtins: Vec<Box<dyn Builtin>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher {
            builtins: vec![Box::new(Hop), Box::new(Reveal), Box::new(Log)],
        }
    }
}

impl Dispatcher {
    /// Re-tokenize `line` and, if its first word names a builtin, run it.
    /// Returns whether the line was handled.
    pub(crate) fn dispatch(
        &self,
        line: &str,
        session: &mut Session,
        out: &mut dyn Write,
    ) -> Result<bool> {
        let tokens = tokenize(line);
        let Some(Token::Name(verb)) = tokens.first() else {
            return Ok(false);
        };
        for builtin in &self.builtins {
            if builtin.name() == verb {
                builtin.run(&tokens[1..], session, out)?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Change the working directory, recording the pre-change directory as the
/// session's previous directory on success.
fn change_dir(session: &mut Session, target: &Path) -> bool {
    let before = env::current_dir().ok();
    if env::set_current_dir(target).is_err() {
        return false;
    }
    if let Some(before) = before {
        session.set_previous_dir(before);
    }
    true
}

/// `hop` — directory navigation.
///
/// Each argument is an independent step; a failed step reports the fixed
/// failure message and the remaining steps still run.
pub(crate) struct Hop;

impl Hop {
    fn step(&self, arg: &str, session: &mut Session, out: &mut dyn Write) -> Result<()> {
        let ok = match arg {
            "~" => match session.home().map(Path::to_path_buf) {
                Some(home) => change_dir(session, &home),
                None => false,
            },
            "." => return Ok(()),
            "-" => match session.previous_dir().map(Path::to_path_buf) {
                Some(previous) => change_dir(session, &previous),
                None => false,
            },
            path => change_dir(session, Path::new(path)),
        };
        if !ok {
            writeln!(out, "{}", BuiltinError::NoSuchDirectory)?;
        }
        Ok(())
    }
}

impl Builtin for Hop {
    fn name(&self) -> &'static str {
        "hop"
    }

    fn run(&self, args: &[Token], session: &mut Session, out: &mut dyn Write) -> Result<()> {
        let steps: Vec<&str> = args.iter().filter_map(Token::text).collect();

        if steps.is_empty() {
            let ok = match session.home().map(Path::to_path_buf) {
                Some(home) => change_dir(session, &home),
                None => false,
            };
            if !ok {
                writeln!(out, "{}", BuiltinError::NoSuchDirectory)?;
            }
            return Ok(());
        }

        for step in steps {
            self.step(step, session, out)?;
        }
        Ok(())
    }
}

/// `reveal` — directory listing.
pub(crate) struct Reveal;

#[derive(Default)]
struct RevealFlags {
    show_all: bool,
    one_per_line: bool,
}

impl Builtin for Reveal {
    fn name(&self) -> &'static str {
        "reveal"
    }

    fn run(&self, args: &[Token], session: &mut Session, out: &mut dyn Write) -> Result<()> {
        let mut flags = RevealFlags::default();
        let mut target_arg: Option<&str> = None;

        for text in args.iter().filter_map(Token::text) {
            if text.len() > 1 && text.starts_with('-') {
                for ch in text[1..].chars() {
                    match ch {
                        'a' => flags.show_all = true,
                        'l' => flags.one_per_line = true,
                        _ => {}
                    }
                }
            } else {
                if target_arg.is_some() {
                    writeln!(out, "{}", BuiltinError::RevealUsage)?;
                    return Ok(());
                }
                target_arg = Some(text);
            }
        }

        let target = match resolve_target(target_arg, session) {
            Some(target) => target,
            None => {
                writeln!(out, "{}", BuiltinError::NoSuchDirectory)?;
                return Ok(());
            }
        };

        if !fs::metadata(&target).map(|m| m.is_dir()).unwrap_or(false) {
            writeln!(out, "{}", BuiltinError::NoSuchDirectory)?;
            return Ok(());
        }

        list_directory(&target, &flags, out)
    }
}

/// Resolve the listing target. `None` means the fixed failure message.
fn resolve_target(arg: Option<&str>, session: &Session) -> Option<PathBuf> {
    match arg {
        None | Some(".") => env::current_dir().ok(),
        Some("~") => session.home().map(Path::to_path_buf),
        Some("..") => {
            let cwd = env::current_dir().ok()?;
            Some(PathBuf::from(lexical_parent(&cwd.to_string_lossy())))
        }
        Some("-") => session.previous_dir().map(Path::to_path_buf),
        Some(path) => Some(PathBuf::from(path)),
    }
}

/// Parent of `path` by string surgery alone: trim to the last `/`, or `/`
/// when no parent segment remains. Deliberately not a chdir/readlink round
/// trip; the result is the textual parent even under symlinks.
fn lexical_parent(path: &str) -> String {
    match path.rfind('/') {
        None | Some(0) => "/".to_string(),
        Some(pos) => path[..pos].to_string(),
    }
}

fn list_directory(path: &Path, flags: &RevealFlags, out: &mut dyn Write) -> Result<()> {
    let Ok(entries) = fs::read_dir(path) else {
        return Ok(());
    };

    let mut names: Vec<OsString> = Vec::new();
    if flags.show_all {
        names.push(OsString::from("."));
        names.push(OsString::from(".."));
    }
    for entry in entries.flatten() {
        let name = entry.file_name();
        if !flags.show_all && name.as_encoded_bytes().first() == Some(&b'.') {
            continue;
        }
        names.push(name);
    }
    names.sort();

    if flags.one_per_line {
        for name in &names {
            writeln!(out, "{}", name.to_string_lossy())?;
        }
    } else {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                write!(out, " ")?;
            }
            write!(out, "{}", name.to_string_lossy())?;
        }
        if !names.is_empty() {
            writeln!(out)?;
        }
    }
    Ok(())
}

/// `log` — history inspection: list, purge, or print one entry by recency.
pub(crate) struct Log;

impl Builtin for Log {
    fn name(&self) -> &'static str {
        INSPECTION_VERB
    }

    fn run(&self, args: &[Token], session: &mut Session, out: &mut dyn Write) -> Result<()> {
        if args.first() == Some(&Token::End) {
            for entry in session.history().list() {
                writeln!(out, "{entry}")?;
            }
            return Ok(());
        }

        match args.first().and_then(Token::text) {
            Some("purge") => {
                // Persistence failures are swallowed; history simply stays.
                let _ = session.history().purge();
            }
            Some("execute") => {
                let entry = args
                    .get(1)
                    .and_then(Token::text)
                    .and_then(parse_recency_index)
                    .and_then(|index| session.history().retrieve(index).ok());
                match entry {
                    Some(entry) => writeln!(out, "{entry}")?,
                    None => writeln!(out, "{}", BuiltinError::LogUsage)?,
                }
            }
            _ => writeln!(out, "{}", BuiltinError::LogUsage)?,
        }
        Ok(())
    }
}

/// A syntactically clean, positive integer; anything else (sign-only, empty,
/// trailing junk, zero, overflow) is rejected.
fn parse_recency_index(text: &str) -> Option<usize> {
    text.parse::<usize>().ok().filter(|&index| index > 0)
}
