//! # twentyone-engine: Blackjack Game Core
//!
//! A deterministic single-player blackjack engine. Provides deck construction
//! and shuffling, soft/hard Ace scoring, the round state machine
//! (deal, hit, stand, dealer turn, settlement), and the view projection that
//! hides the dealer's hole card while a round is live.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Serializable deck with ChaCha20-seeded shuffling
//! - [`hand`] - Hand container and Ace-flex scoring
//! - [`round`] - Round state machine, payouts, and dealer-turn driving
//! - [`view`] - Player-facing projection of a round
//! - [`errors`] - Error types for round operations
//!
//! ## Quick Start
//!
//! ```rust
//! use twentyone_engine::round::{DealerMove, Phase, RoundState, DEALER_STAND_SCORE};
//! use twentyone_engine::hand::score_hand;
//! use twentyone_engine::view::GameView;
//!
//! let mut round = RoundState::new(1_000);
//! round.start(10, Some(42)).expect("start round");
//!
//! if round.phase() == Phase::InPlay {
//!     // stand immediately and let the house rule drive the dealer
//!     let outcome = round
//!         .run_dealer(|_player, dealer| {
//!             if score_hand(dealer) < DEALER_STAND_SCORE {
//!                 DealerMove::Hit
//!             } else {
//!                 DealerMove::Stand
//!             }
//!         })
//!         .expect("dealer turn");
//!     println!("round ended: {:?}", outcome);
//! }
//!
//! let view = GameView::render(&round);
//! println!("{}", view.message);
//! ```
//!
//! ## Deterministic Rounds
//!
//! A seeded start reproduces the same shuffle:
//!
//! ```rust
//! use twentyone_engine::round::RoundState;
//!
//! let mut a = RoundState::new(100);
//! let mut b = RoundState::new(100);
//! a.start(5, Some(7)).unwrap();
//! b.start(5, Some(7)).unwrap();
//! assert_eq!(a.player_hand(), b.player_hand());
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod hand;
pub mod round;
pub mod view;
