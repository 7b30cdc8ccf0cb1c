//! Tests for dealing and drawing from the word deck.

use bingo_core::{Card, CardError, DeckError, WordDeck};
use std::collections::HashSet;

fn vocabulary(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("word{i}")).collect()
}

#[test]
fn test_sample_is_distinct_subset() {
    let vocab = vocabulary(30);
    let known: HashSet<&String> = vocab.iter().collect();

    for seed in 0..50 {
        let mut deck = WordDeck::with_seed(vocab.clone(), seed);
        for size in 1..=5 {
            let words = deck.sample(size).expect("vocabulary is large enough");
            assert_eq!(words.len(), size * size);

            let unique: HashSet<&String> = words.iter().collect();
            assert_eq!(unique.len(), words.len(), "seed {seed} size {size}");
            assert!(words.iter().all(|w| known.contains(w)));
        }
    }
}

#[test]
fn test_sample_does_not_draw() {
    let mut deck = WordDeck::with_seed(vocabulary(9), 5);
    deck.sample(3).expect("exactly enough words");
    assert!(deck.history().is_empty());
    assert_eq!(deck.remaining(), 9);
}

#[test]
fn test_sample_insufficient_vocabulary() {
    let mut deck = WordDeck::with_seed(vocabulary(8), 0);
    assert_eq!(
        deck.sample(3),
        Err(DeckError::InsufficientVocabulary {
            size: 3,
            needed: 9,
            available: 8,
        })
    );
}

#[test]
fn test_draw_never_repeats_until_exhausted() {
    for seed in 0..20 {
        let vocab = vocabulary(12);
        let mut deck = WordDeck::with_seed(vocab.clone(), seed);
        let mut seen = HashSet::new();

        for _ in 0..vocab.len() {
            let word = deck.draw_next().expect("words remain");
            assert!(seen.insert(word), "seed {seed} repeated a word");
        }

        assert_eq!(seen.len(), vocab.len());
        assert_eq!(
            deck.draw_next(),
            Err(DeckError::DeckExhausted { drawn: 12 })
        );
        // Exhaustion is sticky.
        assert!(deck.draw_next().is_err());
    }
}

#[test]
fn test_exact_vocabulary_deals_two_independent_cards() {
    let vocab: Vec<String> = ["alpha", "beta", "gamma", "delta"]
        .map(String::from)
        .to_vec();
    let mut deck = WordDeck::with_seed(vocab.clone(), 11);

    for _ in 0..2 {
        let card = Card::deal(&mut deck, 2).expect("four words fill a 2x2 card");
        let mut on_card: Vec<String> = (0..2)
            .flat_map(|r| (0..2).map(move |c| (r, c)))
            .filter_map(|(r, c)| card.cell(r, c).map(|cell| cell.word().to_string()))
            .collect();
        on_card.sort();
        let mut expected = vocab.clone();
        expected.sort();
        assert_eq!(on_card, expected);
    }
    assert_eq!(deck.remaining(), 4);
}

#[test]
fn test_deal_propagates_deck_error() {
    let mut deck = WordDeck::with_seed(vocabulary(3), 0);
    assert!(matches!(
        Card::deal(&mut deck, 2),
        Err(CardError::Deck(DeckError::InsufficientVocabulary { .. }))
    ));
    assert_eq!(Card::deal(&mut deck, 0), Err(CardError::ZeroSize));
}
