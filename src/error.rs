use thiserror::Error;

use crate::game::RoundState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("shoe needs at least one deck, got {0}")]
    InvalidDeckCount(u8),
    #[error("invalid rules: {0}")]
    InvalidRules(String),
    #[error("invalid strategy chart: {0}")]
    InvalidStrategy(String),
    #[error("no cards left in the shoe")]
    EmptyShoe,
    #[error("action rejected: {0}")]
    IllegalAction(#[from] IllegalAction),
}

/// Reasons a command is refused. A refused command leaves the game untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalAction {
    #[error("expected state {expected}, game is {actual}")]
    WrongState {
        expected: RoundState,
        actual: RoundState,
    },
    #[error("not this player's turn")]
    NotPlayersTurn,
    #[error("unknown player")]
    UnknownPlayer,
    #[error("player has no active hand")]
    NoActiveHand,
    #[error("no player has placed a bet")]
    NoPlayerHands,
    #[error("bankroll must be a finite, non-negative amount")]
    InvalidBankroll,
    #[error("bet is below the table minimum")]
    BetBelowMinimum,
    #[error("bet exceeds the available bankroll")]
    InsufficientBankroll,
    #[error("bet cannot change once cards are dealt")]
    BetLocked,
    #[error("hand cannot double down")]
    CannotDouble,
    #[error("hand cannot split")]
    CannotSplit,
    #[error("hand cannot surrender")]
    CannotSurrender,
    #[error("{0} is not allowed by the table rules")]
    DisallowedByRules(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
