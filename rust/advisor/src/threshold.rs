use twentyone_engine::cards::Card;
use twentyone_engine::hand::score_hand;
use twentyone_engine::round::{DealerMove, DEALER_STAND_SCORE};

use crate::DealerPolicy;

/// The deterministic house rule: hit while the dealer's score is below the
/// stand threshold, stand at or above it. Ignores the player's hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPolicy {
    stand_on: u32,
}

impl ThresholdPolicy {
    pub fn new(stand_on: u32) -> Self {
        Self { stand_on }
    }

    pub fn stand_on(&self) -> u32 {
        self.stand_on
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::new(DEALER_STAND_SCORE)
    }
}

impl DealerPolicy for ThresholdPolicy {
    fn decide(&self, _player: &[Card], dealer: &[Card]) -> DealerMove {
        if score_hand(dealer) < self.stand_on {
            DealerMove::Hit
        } else {
            DealerMove::Stand
        }
    }

    fn name(&self) -> &str {
        "ThresholdPolicy"
    }
}
