use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};

/// Best blackjack value of a set of cards. Aces start at 11; while the total
/// is over 21 and an Ace is still counted high, one Ace at a time drops to 1.
/// The result does not depend on card order.
pub fn score_hand(cards: &[Card]) -> u32 {
    let mut total = 0;
    let mut high_aces = 0;
    for card in cards {
        if card.rank == Rank::Ace {
            high_aces += 1;
        }
        total += card.value();
    }
    while total > 21 && high_aces > 0 {
        total -= 10;
        high_aces -= 1;
    }
    total
}

/// Cards held by one side of the table. Append-only during a round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn score(&self) -> u32 {
        score_hand(&self.cards)
    }

    pub fn is_bust(&self) -> bool {
        self.score() > 21
    }

    /// Natural blackjack: exactly two cards scoring 21.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.score() == 21
    }
}
