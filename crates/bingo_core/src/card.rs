//! A player's bingo card: a square grid of distinct words.

use crate::deck::{DeckError, WordDeck};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Errors raised when building or marking a card.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum CardError {
    /// Cards must be at least 1x1.
    #[display("Card size must be at least 1")]
    ZeroSize,

    /// The number of words does not fill the grid exactly.
    #[display("A {size}x{size} card needs {expected} words, got {actual}")]
    WordCount {
        /// Card size.
        size: usize,
        /// Words required.
        expected: usize,
        /// Words supplied.
        actual: usize,
    },

    /// The same word appears twice.
    #[display("Word {_0:?} appears more than once")]
    DuplicateWord(#[error(not(source))] String),

    /// Coordinates outside the grid.
    #[display("Cell ({row}, {col}) is outside a {size}x{size} card")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Card size.
        size: usize,
    },

    /// Dealing words from the deck failed.
    #[display("{_0}")]
    #[from]
    Deck(DeckError),
}

/// One square of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    word: String,
    marked: bool,
}

impl Cell {
    fn new(word: String) -> Self {
        Self { word, marked: false }
    }

    /// Returns the word printed on this cell.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Returns true once the cell has been marked.
    pub fn is_marked(&self) -> bool {
        self.marked
    }
}

/// A completed winning pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Line {
    /// Every cell of a row (zero-based).
    #[display("row {_0}")]
    Row(usize),
    /// Every cell of a column (zero-based).
    #[display("column {_0}")]
    Column(usize),
    /// Top-left to bottom-right.
    #[display("main diagonal")]
    MainDiagonal,
    /// Top-right to bottom-left.
    #[display("anti-diagonal")]
    AntiDiagonal,
}

/// A size×size grid of words, laid out row-major.
///
/// Words never change after creation; cells only go from unmarked to marked.
/// Deserialized cards pass the same checks as [`Card::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCard")]
pub struct Card {
    size: usize,
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct RawCard {
    size: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawCard> for Card {
    type Error = CardError;

    fn try_from(raw: RawCard) -> Result<Self, Self::Error> {
        let marked: Vec<bool> = raw.cells.iter().map(|c| c.marked).collect();
        let mut card = Card::new(raw.size, raw.cells.into_iter().map(|c| c.word).collect())?;
        for (cell, marked) in card.cells.iter_mut().zip(marked) {
            cell.marked = marked;
        }
        Ok(card)
    }
}

impl Card {
    /// Lays out `size * size` distinct words row by row, all unmarked.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::ZeroSize`], [`CardError::WordCount`] or
    /// [`CardError::DuplicateWord`] when the words cannot form a valid card.
    #[instrument(skip(words), fields(words = words.len()))]
    pub fn new(size: usize, words: Vec<String>) -> Result<Self, CardError> {
        if size == 0 {
            return Err(CardError::ZeroSize);
        }
        let expected = size * size;
        if words.len() != expected {
            return Err(CardError::WordCount {
                size,
                expected,
                actual: words.len(),
            });
        }

        let mut seen = HashSet::with_capacity(expected);
        if let Some(duplicate) = words.iter().find(|word| !seen.insert(word.as_str())) {
            warn!(word = %duplicate, "Duplicate word on card");
            return Err(CardError::DuplicateWord(duplicate.clone()));
        }

        Ok(Self {
            size,
            cells: words.into_iter().map(Cell::new).collect(),
        })
    }

    /// Deals a fresh card from the deck's vocabulary.
    ///
    /// The deck's drawn history is left untouched.
    #[instrument(skip(deck))]
    pub fn deal(deck: &mut WordDeck, size: usize) -> Result<Self, CardError> {
        if size == 0 {
            return Err(CardError::ZeroSize);
        }
        let words = deck.sample(size)?;
        Self::new(size, words)
    }

    /// Returns the edge length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the cell at the given coordinates.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.size && col < self.size {
            self.cells.get(row * self.size + col)
        } else {
            None
        }
    }

    /// Returns one row of cells.
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        let start = row.checked_mul(self.size)?;
        self.cells.get(start..start.checked_add(self.size)?)
    }

    /// Returns how many cells are marked.
    pub fn marked_count(&self) -> usize {
        self.cells.iter().filter(|c| c.marked).count()
    }

    /// Checks whether the word is printed anywhere on the card.
    pub fn contains(&self, word: &str) -> bool {
        self.locate(word).is_some()
    }

    /// Finds the first cell holding the word.
    pub fn locate(&self, word: &str) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|c| c.word == word)
            .map(|i| (i / self.size, i % self.size))
    }

    /// Marks a cell. Marking an already marked cell changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::OutOfBounds`] for coordinates outside the grid.
    #[instrument(skip(self), fields(size = self.size))]
    pub fn mark(&mut self, row: usize, col: usize) -> Result<(), CardError> {
        if row >= self.size || col >= self.size {
            return Err(CardError::OutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        let cell = &mut self.cells[row * self.size + col];
        if !cell.marked {
            cell.marked = true;
            debug!(word = %cell.word, "Marked cell");
        }
        Ok(())
    }

    fn is_marked(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.size + col].marked
    }

    /// Returns the first completed pattern, if any.
    ///
    /// Diagonals are checked first, then each index's row and column.
    pub fn completed_line(&self) -> Option<Line> {
        let n = self.size;
        if (0..n).all(|i| self.is_marked(i, i)) {
            return Some(Line::MainDiagonal);
        }
        if (0..n).all(|i| self.is_marked(i, n - 1 - i)) {
            return Some(Line::AntiDiagonal);
        }
        for i in 0..n {
            if (0..n).all(|j| self.is_marked(i, j)) {
                return Some(Line::Row(i));
            }
            if (0..n).all(|j| self.is_marked(j, i)) {
                return Some(Line::Column(i));
            }
        }
        None
    }

    /// True iff a full row, column or diagonal is marked.
    #[instrument(skip(self), fields(marked = self.marked_count()))]
    pub fn has_winning_pattern(&self) -> bool {
        self.completed_line().is_some()
    }
}
