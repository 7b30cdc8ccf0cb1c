//! Best-effort game journal with timestamped lines.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{instrument, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Appends `"<timestamp> <message>"` lines to a journal file.
///
/// Write failures are reported through tracing and otherwise ignored, so a
/// broken journal never interrupts a game.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    /// Creates a journal at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Creates a journal named `<timestamp>-bingo-<role>.txt` inside `dir`.
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn in_dir(dir: impl AsRef<Path>, role: &str) -> Self {
        let stamp = Local::now().format(TIMESTAMP_FORMAT);
        Self::at(dir.as_ref().join(format!("{stamp}-bingo-{role}.txt")))
    }

    /// Journal for the coordinator.
    pub fn coordinator(dir: impl AsRef<Path>) -> Self {
        Self::in_dir(dir, "Master")
    }

    /// Journal for the player with the given one-based number.
    pub fn player(dir: impl AsRef<Path>, number: usize) -> Self {
        Self::in_dir(dir, &format!("Spieler{number}"))
    }

    /// A journal that discards everything.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Returns the journal file, if enabled.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends one timestamped line.
    pub fn append(&self, message: impl AsRef<str>) {
        let Some(path) = &self.path else {
            return;
        };
        let stamp = Local::now().format(TIMESTAMP_FORMAT);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{} {}", stamp, message.as_ref()));
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Failed to write journal entry");
        }
    }
}
