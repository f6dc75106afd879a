use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::RoundError;
use crate::hand::Hand;

/// Target score and bust threshold.
pub const BLACKJACK: u32 = 21;
/// House rule: the dealer keeps drawing below this score.
pub const DEALER_STAND_SCORE: u32 = 17;

/// Lifecycle of a single round. `Settled` rounds are read-only except for
/// starting the next round, which carries the bankroll over.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Betting,
    InPlay,
    DealerTurn,
    Settled,
}

/// A dealer decision for one draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DealerMove {
    Hit,
    Stand,
}

/// How a settled round ended. Payouts follow from this alone.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Player dealt a natural 21; pays like a regular win.
    Blackjack,
    /// Player drew past 21; stake is lost.
    PlayerBust,
    /// Dealer drew past 21; pays 2x the bet.
    DealerBust,
    /// Player outscored the dealer; pays 2x the bet.
    PlayerWin,
    /// Dealer outscored the player; stake is lost.
    DealerWin,
    /// Equal scores; the stake is returned.
    Push,
}

/// The unit of persisted game state between requests: deck, both hands, the
/// live bet, the bankroll, and the phase. The web layer serializes exactly
/// this shape into the session store and hands it back for the next action;
/// nothing in this module retains state across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    deck: Deck,
    player_hand: Hand,
    dealer_hand: Hand,
    bet: u32,
    bankroll: i64,
    phase: Phase,
    outcome: Option<Outcome>,
}

impl RoundState {
    /// Fresh state holding only a bankroll, waiting for the first bet.
    pub fn new(bankroll: i64) -> Self {
        Self {
            deck: Deck::new(),
            player_hand: Hand::new(),
            dealer_hand: Hand::new(),
            bet: 0,
            bankroll,
            phase: Phase::Betting,
            outcome: None,
        }
    }

    /// Rebuild a round from its persisted parts. Counterpart of serializing
    /// the round into the session store.
    pub fn from_parts(
        deck: Deck,
        player_hand: Hand,
        dealer_hand: Hand,
        bet: u32,
        bankroll: i64,
        phase: Phase,
        outcome: Option<Outcome>,
    ) -> Self {
        Self {
            deck,
            player_hand,
            dealer_hand,
            bet,
            bankroll,
            phase,
            outcome,
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }
    pub fn player_hand(&self) -> &Hand {
        &self.player_hand
    }
    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }
    pub fn bet(&self) -> u32 {
        self.bet
    }
    pub fn bankroll(&self) -> i64 {
        self.bankroll
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// True while an unfinished round is on the table.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::InPlay | Phase::DealerTurn)
    }

    /// Begins a round: fresh shuffled deck, two cards each, bet deducted.
    /// Legal from `Betting` or from `Settled` (the next round keeps the
    /// bankroll); starting over an active round is a caller-ordering error.
    pub fn start(&mut self, bet: u32, seed: Option<u64>) -> Result<(), RoundError> {
        let mut deck = Deck::new();
        deck.shuffle(seed);
        self.start_from_deck(bet, deck)
    }

    /// Same as [`RoundState::start`] but dealing from a caller-supplied deck.
    /// This is the deterministic entry point used by tests and replays.
    pub fn start_from_deck(&mut self, bet: u32, mut deck: Deck) -> Result<(), RoundError> {
        if self.is_active() {
            return Err(RoundError::IllegalTransition {
                action: "start",
                phase: self.phase,
            });
        }

        let mut player_hand = Hand::new();
        let mut dealer_hand = Hand::new();
        for _ in 0..2 {
            player_hand.push(deck.deal().ok_or(RoundError::EmptyDeck)?);
        }
        for _ in 0..2 {
            dealer_hand.push(deck.deal().ok_or(RoundError::EmptyDeck)?);
        }

        self.deck = deck;
        self.player_hand = player_hand;
        self.dealer_hand = dealer_hand;
        self.bet = bet;
        self.bankroll -= i64::from(bet);
        self.outcome = None;

        if self.player_hand.is_blackjack() {
            self.settle_with(Outcome::Blackjack);
        } else {
            self.phase = Phase::InPlay;
        }
        Ok(())
    }

    /// Deals one card to the player. Going past 21 settles the round as a
    /// bust with no payout.
    pub fn hit(&mut self) -> Result<(), RoundError> {
        if self.phase != Phase::InPlay {
            return Err(RoundError::IllegalTransition {
                action: "hit",
                phase: self.phase,
            });
        }
        let card = self.deck.deal().ok_or(RoundError::EmptyDeck)?;
        self.player_hand.push(card);
        if self.player_hand.is_bust() {
            self.settle_with(Outcome::PlayerBust);
        }
        Ok(())
    }

    /// Ends the player's turn. The dealer's draws are then driven step by
    /// step via [`RoundState::dealer_draw`] and closed with
    /// [`RoundState::settle`], or in one go with [`RoundState::run_dealer`].
    pub fn stand(&mut self) -> Result<(), RoundError> {
        if self.phase != Phase::InPlay {
            return Err(RoundError::IllegalTransition {
                action: "stand",
                phase: self.phase,
            });
        }
        self.phase = Phase::DealerTurn;
        Ok(())
    }

    /// The dealer stops drawing at 21 or better, or when the deck is out.
    pub fn dealer_turn_over(&self) -> bool {
        self.dealer_hand.score() >= BLACKJACK || self.deck.is_empty()
    }

    /// Deals one card to the dealer. An exhausted deck ends the turn early
    /// instead of failing the round.
    pub fn dealer_draw(&mut self) -> Result<(), RoundError> {
        if self.phase != Phase::DealerTurn {
            return Err(RoundError::IllegalTransition {
                action: "dealer_draw",
                phase: self.phase,
            });
        }
        if let Some(card) = self.deck.deal() {
            self.dealer_hand.push(card);
        }
        Ok(())
    }

    /// Compares final scores and pays out. Outcome computation always uses
    /// the full dealer hand, regardless of what the view withheld.
    pub fn settle(&mut self) -> Result<Outcome, RoundError> {
        if self.phase != Phase::DealerTurn {
            return Err(RoundError::IllegalTransition {
                action: "settle",
                phase: self.phase,
            });
        }
        let player = self.player_hand.score();
        let dealer = self.dealer_hand.score();
        let outcome = if dealer > BLACKJACK {
            Outcome::DealerBust
        } else if player > dealer {
            Outcome::PlayerWin
        } else if dealer > player {
            Outcome::DealerWin
        } else {
            Outcome::Push
        };
        self.settle_with(outcome);
        Ok(outcome)
    }

    /// Runs the whole dealer turn against a decision function and settles.
    /// The loop is bounded: each hit strictly raises the dealer score, so it
    /// ends within 11 draws even if `decide` always answers `Hit`.
    pub fn run_dealer<F>(&mut self, mut decide: F) -> Result<Outcome, RoundError>
    where
        F: FnMut(&[Card], &[Card]) -> DealerMove,
    {
        if self.phase == Phase::InPlay {
            self.stand()?;
        }
        while self.phase == Phase::DealerTurn && !self.dealer_turn_over() {
            match decide(self.player_hand.cards(), self.dealer_hand.cards()) {
                DealerMove::Hit => self.dealer_draw()?,
                DealerMove::Stand => break,
            }
        }
        self.settle()
    }

    fn settle_with(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Blackjack | Outcome::DealerBust | Outcome::PlayerWin => {
                self.bankroll += 2 * i64::from(self.bet);
            }
            Outcome::Push => {
                self.bankroll += i64::from(self.bet);
            }
            Outcome::PlayerBust | Outcome::DealerWin => {}
        }
        self.outcome = Some(outcome);
        self.phase = Phase::Settled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_round_waits_for_a_bet() {
        let round = RoundState::new(1_000);
        assert_eq!(round.phase(), Phase::Betting);
        assert_eq!(round.bankroll(), 1_000);
        assert!(round.player_hand().is_empty());
        assert!(!round.is_active());
    }

    #[test]
    fn start_deals_two_cards_each_and_deducts_the_bet() {
        let mut round = RoundState::new(1_000);
        round.start(50, Some(9)).expect("start");

        assert_eq!(round.player_hand().len(), 2);
        assert_eq!(round.dealer_hand().len(), 2);
        assert_eq!(round.deck().remaining(), 48);
        assert_eq!(round.bet(), 50);
        match round.phase() {
            // natural 21 settles immediately and pays 2x
            Phase::Settled => {
                assert_eq!(round.outcome(), Some(Outcome::Blackjack));
                assert_eq!(round.bankroll(), 1_050);
            }
            Phase::InPlay => assert_eq!(round.bankroll(), 950),
            other => panic!("unexpected phase after start: {:?}", other),
        }
    }

    #[test]
    fn hit_and_stand_require_an_in_play_round() {
        let mut round = RoundState::new(100);
        assert_eq!(
            round.hit(),
            Err(RoundError::IllegalTransition {
                action: "hit",
                phase: Phase::Betting
            })
        );
        assert_eq!(
            round.stand(),
            Err(RoundError::IllegalTransition {
                action: "stand",
                phase: Phase::Betting
            })
        );
    }

    #[test]
    fn round_state_survives_a_serde_round_trip() {
        let mut round = RoundState::new(500);
        round.start(25, Some(4)).expect("start");

        let json = serde_json::to_string(&round).expect("serialize");
        let back: RoundState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, round);
    }
}
