use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{full_deck, Card};

/// An ordered run of cards consumed from the back. The deck carries no RNG of
/// its own so that a round in flight can be serialized into the session store
/// and rebuilt without losing its remaining order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Full 52-card deck in canonical order. Call [`Deck::shuffle`] before
    /// dealing a real round.
    pub fn new() -> Self {
        Self { cards: full_deck() }
    }

    /// Rebuild a deck from previously serialized cards. This is the
    /// rehydration contract at the session boundary; it is also how tests
    /// stack known cards.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Uniform Fisher-Yates shuffle. A fixed seed reproduces the same order,
    /// `None` draws a fresh seed so distinct rounds differ.
    pub fn shuffle(&mut self, seed: Option<u64>) {
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        self.cards.shuffle(&mut rng);
    }

    /// Removes and returns the top card, or `None` when the deck is out.
    /// Callers end the dealer's turn on `None` rather than failing the round.
    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
