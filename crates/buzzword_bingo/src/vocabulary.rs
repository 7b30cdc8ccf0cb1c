//! Word sources feeding the deck.

use crate::protocol::{self, WIN};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Errors loading a vocabulary.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum VocabularyError {
    /// The word file could not be read.
    #[display("Cannot read word file {}: {source}", path.display())]
    Unreadable {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The source produced no usable words.
    #[display("Word source {_0:?} contains no words")]
    Empty(#[error(not(source))] String),

    /// A word collides with the protocol sentinel.
    #[display("\"WIN\" is reserved and cannot be used as a word")]
    ReservedWord,
}

/// Something that can supply the game vocabulary.
pub trait WordSource {
    /// Loads the words in order.
    ///
    /// # Errors
    ///
    /// Fails if the source is missing, unreadable or empty.
    fn load_vocabulary(&self) -> Result<Vec<String>, VocabularyError>;
}

/// Reads one word per line from a text file.
#[derive(Debug, Clone)]
pub struct FileWordSource {
    path: PathBuf,
}

impl FileWordSource {
    /// Creates a source for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WordSource for FileWordSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load_vocabulary(&self) -> Result<Vec<String>, VocabularyError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| VocabularyError::Unreadable {
                path: self.path.clone(),
                source,
            })?;
        let words = clean(content.lines(), &self.path.display().to_string())?;
        info!(words = words.len(), "Vocabulary loaded");
        Ok(words)
    }
}

/// An in-memory word list.
#[derive(Debug, Clone)]
pub struct StaticWords(pub Vec<String>);

impl WordSource for StaticWords {
    #[instrument(skip(self), fields(words = self.0.len()))]
    fn load_vocabulary(&self) -> Result<Vec<String>, VocabularyError> {
        clean(self.0.iter().map(String::as_str), "static word list")
    }
}

/// Trims lines, drops blanks and duplicates, and rejects the sentinel.
fn clean<'a>(
    lines: impl Iterator<Item = &'a str>,
    origin: &str,
) -> Result<Vec<String>, VocabularyError> {
    let mut seen = HashSet::new();
    let mut words = Vec::new();

    for line in lines {
        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        if word == WIN {
            warn!(origin, "Vocabulary contains the reserved sentinel");
            return Err(VocabularyError::ReservedWord);
        }
        if !protocol::is_wire_safe(word) {
            warn!(origin, len = word.len(), "Skipping word that cannot be sent");
            continue;
        }
        if seen.insert(word.to_string()) {
            words.push(word.to_string());
        } else {
            debug!(word, "Skipping duplicate word");
        }
    }

    if words.is_empty() {
        return Err(VocabularyError::Empty(origin.to_string()));
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_source_trims_and_dedupes() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "synergy\n\n  leverage \nsynergy\nparadigm shift").expect("write");

        let words = FileWordSource::new(file.path())
            .load_vocabulary()
            .expect("words load");
        assert_eq!(words, vec!["synergy", "leverage", "paradigm shift"]);
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let result = FileWordSource::new("/definitely/not/here/words.txt").load_vocabulary();
        assert!(matches!(result, Err(VocabularyError::Unreadable { .. })));
    }

    #[test]
    fn test_blank_file_is_empty() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "\n   \n").expect("write");
        let result = FileWordSource::new(file.path()).load_vocabulary();
        assert!(matches!(result, Err(VocabularyError::Empty(_))));
    }

    #[test]
    fn test_sentinel_is_rejected() {
        let source = StaticWords(vec!["alpha".into(), "WIN".into()]);
        assert!(matches!(
            source.load_vocabulary(),
            Err(VocabularyError::ReservedWord)
        ));
    }
}
