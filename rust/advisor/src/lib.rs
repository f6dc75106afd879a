//! # twentyone-advisor: Dealer Decision Policies
//!
//! Decides whether the dealer hits or stands. The web layer may consult an
//! external advisory service; this crate provides the policy seam and the
//! deterministic house rule every deployment falls back to.
//!
//! ## Core Components
//!
//! - [`DealerPolicy`] - Trait for dealer decision-making
//! - [`threshold`] - The fixed "hit below 17" house rule
//! - [`create_policy`] - Factory function for policies by name
//!
//! ## Quick Start
//!
//! ```rust
//! use twentyone_advisor::create_policy;
//! use twentyone_engine::cards::{Card, Rank, Suit};
//! use twentyone_engine::round::DealerMove;
//!
//! let policy = create_policy("threshold");
//! let player = [
//!     Card::new(Suit::Spades, Rank::Ten),
//!     Card::new(Suit::Hearts, Rank::Nine),
//! ];
//! let dealer = [
//!     Card::new(Suit::Clubs, Rank::Ten),
//!     Card::new(Suit::Diamonds, Rank::Six),
//! ];
//! assert_eq!(policy.decide(&player, &dealer), DealerMove::Hit);
//! ```

use twentyone_engine::cards::Card;
use twentyone_engine::round::DealerMove;

pub mod threshold;

/// Interface for dealer decision-making. Implementations look at both hands
/// and answer with a single move; they never fail and never block.
pub trait DealerPolicy: Send + Sync {
    /// Choose the dealer's next move given the full player and dealer hands.
    fn decide(&self, player: &[Card], dealer: &[Card]) -> DealerMove;

    /// Name of this policy, for logging.
    fn name(&self) -> &str;
}

/// Create a policy by name. Unknown names fall back to the house rule so a
/// misconfigured deployment still deals a correct game.
pub fn create_policy(name: &str) -> Box<dyn DealerPolicy> {
    match name {
        "threshold" | "" => Box::new(threshold::ThresholdPolicy::default()),
        _ => Box::new(threshold::ThresholdPolicy::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_policy_returns_the_house_rule_by_default() {
        assert_eq!(create_policy("threshold").name(), "ThresholdPolicy");
        assert_eq!(create_policy("").name(), "ThresholdPolicy");
        assert_eq!(create_policy("no-such-policy").name(), "ThresholdPolicy");
    }

    #[test]
    fn dealer_policy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<Box<dyn DealerPolicy>>();
    }
}
