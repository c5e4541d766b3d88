//! Persistent, size-bounded log of accepted command lines.
//!
//! The backing store is a plain text file, one entry per line, oldest first,
//! no escaping. Every operation re-reads the file in full; there is no
//! in-memory cache, so the file is always the single source of truth even if
//! something else rewrites it between calls.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::lexer::{Token, tokenize};

/// Maximum number of entries kept; the oldest are evicted past this.
pub const HISTORY_MAX: usize = 15;

/// The history-inspection verb. Lines led by this word are never recorded,
/// so inspecting history does not pollute it.
pub const INSPECTION_VERB: &str = "log";

#[derive(Debug, Error)]
pub enum HistoryError {
    /// The 1-based recency index does not name a stored entry.
    #[error("history index {0} is out of range")]
    IndexOutOfRange(usize),
    /// The backing store could not be read or written. Callers treat this as
    /// non-fatal; the interpreter proceeds without history.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Handle to the history backing file.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        HistoryStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest to newest. A missing or unreadable store reads as
    /// empty.
    pub fn list(&self) -> Vec<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => text.lines().map(str::to_owned).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Record one accepted command line.
    ///
    /// Lines whose leading word is [`INSPECTION_VERB`] are skipped, as is a
    /// line textually equal to the current newest entry (immediate repeats
    /// only; earlier duplicates are kept). On overflow the oldest entries are
    /// evicted down to [`HISTORY_MAX`].
    pub fn append(&self, line: &str) -> Result<(), HistoryError> {
        if leading_word_is(line, INSPECTION_VERB) {
            return Ok(());
        }

        let mut entries = self.list();
        if entries.last().map(String::as_str) == Some(line) {
            return Ok(());
        }

        entries.push(line.to_owned());
        if entries.len() > HISTORY_MAX {
            entries.drain(..entries.len() - HISTORY_MAX);
        }
        self.write_back(&entries)
    }

    /// Truncate the store to empty. Idempotent.
    pub fn purge(&self) -> Result<(), HistoryError> {
        fs::write(&self.path, "")?;
        Ok(())
    }

    /// Entry at 1-based recency `index`: 1 is the newest stored entry,
    /// `len()` the oldest.
    pub fn retrieve(&self, index: usize) -> Result<String, HistoryError> {
        let mut entries = self.list();
        if index == 0 || index > entries.len() {
            return Err(HistoryError::IndexOutOfRange(index));
        }
        let pos = entries.len() - index;
        Ok(entries.swap_remove(pos))
    }

    fn write_back(&self, entries: &[String]) -> Result<(), HistoryError> {
        let mut text = String::new();
        for entry in entries {
            text.push_str(entry);
            text.push('\n');
        }
        fs::write(&self.path, text)?;
        Ok(())
    }
}

fn leading_word_is(line: &str, verb: &str) -> bool {
    matches!(tokenize(line).first(), Some(Token::Name(word)) if word == verb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join(".osh_history"))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        assert!(store_in(&dir).list().is_empty());
    }

    #[test]
    fn append_then_list_preserves_order() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.append("a").unwrap();
        store.append("b").unwrap();
        store.append("c").unwrap();
        assert_eq!(store.list(), vec!["a", "b", "c"]);
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        for i in 0..16 {
            store.append(&format!("cmd{i}")).unwrap();
        }
        let entries = store.list();
        assert_eq!(entries.len(), HISTORY_MAX);
        assert_eq!(entries.first().map(String::as_str), Some("cmd1"));
        assert_eq!(entries.last().map(String::as_str), Some("cmd15"));
    }

    #[test]
    fn immediate_repeats_are_suppressed_but_not_deduplicated() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.append("ls").unwrap();
        store.append("ls").unwrap();
        assert_eq!(store.list(), vec!["ls"]);

        store.append("pwd").unwrap();
        store.append("ls").unwrap();
        assert_eq!(store.list(), vec!["ls", "pwd", "ls"]);
    }

    #[test]
    fn inspection_verb_is_never_recorded() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.append("log").unwrap();
        store.append("log execute 3").unwrap();
        assert!(store.list().is_empty());

        // Only the leading word is exempt.
        store.append("echo log").unwrap();
        assert_eq!(store.list(), vec!["echo log"]);
    }

    #[test]
    fn retrieve_counts_back_from_newest() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        for line in ["a", "b", "c"] {
            store.append(line).unwrap();
        }
        assert_eq!(store.retrieve(1).unwrap(), "c");
        assert_eq!(store.retrieve(3).unwrap(), "a");
        assert!(matches!(
            store.retrieve(4),
            Err(HistoryError::IndexOutOfRange(4))
        ));
        assert!(matches!(
            store.retrieve(0),
            Err(HistoryError::IndexOutOfRange(0))
        ));
    }

    #[test]
    fn retrieve_from_empty_store_is_out_of_range() {
        let dir = tempdir().unwrap();
        assert!(store_in(&dir).retrieve(1).is_err());
    }

    #[test]
    fn purge_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.append("a").unwrap();
        store.purge().unwrap();
        assert!(store.list().is_empty());
        store.purge().unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn file_layout_is_one_entry_per_line() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.append("a").unwrap();
        store.append("b c | d").unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "a\nb c | d\n");
    }

    #[test]
    fn unwritable_store_reports_io_error() {
        let store = HistoryStore::new(PathBuf::from("/nonexistent-dir/.osh_history"));
        assert!(matches!(store.append("a"), Err(HistoryError::Io(_))));
    }
}
