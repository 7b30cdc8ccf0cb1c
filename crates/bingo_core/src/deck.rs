//! Word deck: the vocabulary and the words drawn from it so far.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Errors raised by deck operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DeckError {
    /// The vocabulary is too small to fill a card of the requested size.
    #[display(
        "A {size}x{size} card needs {needed} words but the vocabulary only has {available}"
    )]
    InsufficientVocabulary {
        /// Requested card size.
        size: usize,
        /// Words needed (`size * size`).
        needed: usize,
        /// Words available in the vocabulary.
        available: usize,
    },

    /// Every word has already been drawn.
    #[display("Deck exhausted after {drawn} draws")]
    DeckExhausted {
        /// Number of words drawn before exhaustion.
        drawn: usize,
    },
}

/// The pool of words for one game.
///
/// The vocabulary never changes after construction. Drawing moves a word
/// into the drawn history; no word is drawn twice.
#[derive(Debug, Clone)]
pub struct WordDeck {
    vocabulary: Vec<String>,
    drawn: HashSet<String>,
    history: Vec<String>,
    // Indices into `vocabulary` not yet drawn.
    undrawn: Vec<usize>,
    rng: StdRng,
}

impl WordDeck {
    /// Creates a deck seeded from the operating system.
    #[instrument(skip(vocabulary), fields(words = vocabulary.len()))]
    pub fn new(vocabulary: Vec<String>) -> Self {
        Self::with_rng(vocabulary, StdRng::from_os_rng())
    }

    /// Creates a deck whose draws and samples are reproducible.
    #[instrument(skip(vocabulary), fields(words = vocabulary.len()))]
    pub fn with_seed(vocabulary: Vec<String>, seed: u64) -> Self {
        Self::with_rng(vocabulary, StdRng::seed_from_u64(seed))
    }

    fn with_rng(vocabulary: Vec<String>, rng: StdRng) -> Self {
        let mut seen = HashSet::new();
        let before = vocabulary.len();
        let vocabulary: Vec<String> = vocabulary
            .into_iter()
            .filter(|word| seen.insert(word.clone()))
            .collect();
        if vocabulary.len() != before {
            warn!(
                duplicates = before - vocabulary.len(),
                "Dropped duplicate words from vocabulary"
            );
        }

        let undrawn = (0..vocabulary.len()).collect();
        Self {
            vocabulary,
            drawn: HashSet::new(),
            history: Vec::new(),
            undrawn,
            rng,
        }
    }

    /// Returns the full vocabulary in load order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Returns the drawn words in draw order.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Returns how many words can still be drawn.
    pub fn remaining(&self) -> usize {
        self.undrawn.len()
    }

    /// Checks whether a word has already been drawn.
    pub fn is_drawn(&self, word: &str) -> bool {
        self.drawn.contains(word)
    }

    /// Picks `size * size` distinct words uniformly at random.
    ///
    /// Sampling does not touch the drawn history, so any number of cards can
    /// be dealt from the same deck.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::InsufficientVocabulary`] if the vocabulary has
    /// fewer than `size * size` words.
    #[instrument(skip(self), fields(vocabulary = self.vocabulary.len()))]
    pub fn sample(&mut self, size: usize) -> Result<Vec<String>, DeckError> {
        let needed = size * size;
        let available = self.vocabulary.len();
        if available < needed {
            warn!(needed, available, "Vocabulary too small for card");
            return Err(DeckError::InsufficientVocabulary {
                size,
                needed,
                available,
            });
        }

        let words = index::sample(&mut self.rng, available, needed)
            .into_iter()
            .map(|i| self.vocabulary[i].clone())
            .collect();
        Ok(words)
    }

    /// Draws one word that has not been drawn before.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::DeckExhausted`] once every word has been drawn.
    #[instrument(skip(self), fields(drawn = self.history.len()))]
    pub fn draw_next(&mut self) -> Result<String, DeckError> {
        if self.undrawn.is_empty() {
            debug!("No undrawn words remain");
            return Err(DeckError::DeckExhausted {
                drawn: self.history.len(),
            });
        }

        let slot = self.rng.random_range(0..self.undrawn.len());
        let index = self.undrawn.swap_remove(slot);
        let word = self.vocabulary[index].clone();

        self.drawn.insert(word.clone());
        self.history.push(word.clone());
        debug!(word = %word, remaining = self.undrawn.len(), "Drew word");
        Ok(word)
    }
}
