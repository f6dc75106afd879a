use serde::Serialize;

use crate::cards::Card;
use crate::hand::score_hand;
use crate::round::{Outcome, Phase, RoundState};

/// What the player is allowed to see. While the round is live the dealer
/// shows only the up card and its face value; once settled the full hand and
/// true score are revealed. Rendering never mutates the round and never
/// feeds back into outcome computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub player_hand: Vec<Card>,
    pub dealer_hand: Vec<Card>,
    pub player_score: u32,
    pub dealer_score: u32,
    pub bankroll: i64,
    pub ended: bool,
    pub message: String,
}

impl GameView {
    pub fn render(round: &RoundState) -> Self {
        let ended = round.phase() == Phase::Settled;
        let dealer_cards = round.dealer_hand().cards();

        let (dealer_hand, dealer_score) = if ended {
            (dealer_cards.to_vec(), score_hand(dealer_cards))
        } else {
            match dealer_cards.first() {
                Some(&up_card) => (vec![up_card], up_card.value()),
                None => (Vec::new(), 0),
            }
        };

        Self {
            player_hand: round.player_hand().cards().to_vec(),
            dealer_hand,
            player_score: round.player_hand().score(),
            dealer_score,
            bankroll: round.bankroll(),
            ended,
            message: message_for(round),
        }
    }
}

fn message_for(round: &RoundState) -> String {
    let text = match round.outcome() {
        Some(Outcome::Blackjack) => "Blackjack! Player wins.",
        Some(Outcome::PlayerBust) => "Player busts. Dealer wins.",
        Some(Outcome::DealerBust) => "Dealer busts! Player wins.",
        Some(Outcome::PlayerWin) => "Player wins!",
        Some(Outcome::DealerWin) => "Dealer wins.",
        Some(Outcome::Push) => "Push.",
        None => match round.phase() {
            Phase::Betting => "Place a bet to start the round.",
            Phase::InPlay => "Hit or stand.",
            Phase::DealerTurn => "Dealer is drawing.",
            Phase::Settled => "",
        },
    };
    text.to_string()
}
