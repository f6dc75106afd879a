use thiserror::Error;

use crate::round::Phase;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoundError {
    #[error("deck exhausted")]
    EmptyDeck,
    #[error("`{action}` is not legal while the round is {phase:?}")]
    IllegalTransition { action: &'static str, phase: Phase },
}
