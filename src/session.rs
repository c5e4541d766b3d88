//! Interpreter-local state.
//!
//! Everything the builtins mutate between invocations lives here: the shell
//! home, the previous working directory, and the history store. The session
//! is an explicit value owned by the interpreter and threaded through
//! dispatch; there are no process-wide statics.

use std::env;
use std::path::{Path, PathBuf};

use crate::history::HistoryStore;

/// File name of the history backing store.
pub const HISTORY_FILE_NAME: &str = ".osh_history";

/// Longest home path that can host the history file. Homes beyond this fall
/// back to the relative store location.
const HOME_PATH_MAX: usize = 4096;

pub struct Session {
    home: Option<PathBuf>,
    previous_dir: Option<PathBuf>,
    history: HistoryStore,
}

impl Session {
    /// Create a session rooted at `home`. When `home` is absent or empty, the
    /// `HOME` environment variable is used; when that is unset too, the
    /// session has no home and `hop`/`reveal ~` report failure.
    pub fn new(home: Option<PathBuf>) -> Self {
        let home = home
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| env::var_os("HOME").map(PathBuf::from))
            .filter(|p| !p.as_os_str().is_empty());
        let history = HistoryStore::new(history_path_for(home.as_deref()));
        Session {
            home,
            previous_dir: None,
            history,
        }
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// The working directory active before the most recent successful
    /// directory change, if any change has happened in this process lifetime.
    pub fn previous_dir(&self) -> Option<&Path> {
        self.previous_dir.as_deref()
    }

    pub fn set_previous_dir(&mut self, dir: PathBuf) {
        self.previous_dir = Some(dir);
    }
}

/// `<home>/.osh_history`, unless the home is absent or too long to host the
/// file, in which case the store lives at the relative [`HISTORY_FILE_NAME`].
fn history_path_for(home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) if home.as_os_str().len() + 1 + HISTORY_FILE_NAME.len() <= HOME_PATH_MAX => {
            home.join(HISTORY_FILE_NAME)
        }
        _ => PathBuf::from(HISTORY_FILE_NAME),
    }
}
