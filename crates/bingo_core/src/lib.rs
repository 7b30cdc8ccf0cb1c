//! Bingo Core - pure word-bingo game logic
//!
//! This crate holds the data structures every bingo participant agrees on,
//! with no networking or terminal concerns.
//!
//! # Architecture
//!
//! - **Deck**: the vocabulary, drawn without replacement
//! - **Card**: a player's size×size grid of words with marked cells
//! - **Line**: the winning patterns (rows, columns, both diagonals)
//!
//! # Example
//!
//! ```
//! use bingo_core::{Card, WordDeck};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let words = ["alpha", "beta", "gamma", "delta"].map(String::from).to_vec();
//! let mut deck = WordDeck::with_seed(words, 7);
//! let card = Card::deal(&mut deck, 2)?;
//! assert_eq!(card.size(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod card;
mod deck;

pub use card::{Card, CardError, Cell, Line};
pub use deck::{DeckError, WordDeck};
