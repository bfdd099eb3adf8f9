//! Error taxonomy for the engine, split into the three families spec.md §7
//! names: non-fatal action/validation errors, fatal engine errors (which
//! abort and roll back a hand), and the structured start-refusal reasons
//! `Table::try_start_hand` returns instead of throwing.

use thiserror::Error;

/// Errors raised while validating or applying a single player action.
/// These never abort a hand: the caller (the Betting Round, via the
/// Action Validator) falls back to the default-action policy of
/// spec.md §4.4 and play continues.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ActionError {
    #[error("invalid bet amount: {amount}, minimum: {minimum}")]
    InvalidBetAmount { amount: u32, minimum: u32 },
    #[error("insufficient chips for action")]
    InsufficientChips,
    #[error("check is not valid while facing a bet")]
    CannotCheckFacingBet,
    #[error("it's not seat {actual}'s turn (expected seat {expected})")]
    NotSeatsTurn { expected: usize, actual: usize },
    #[error("seat {0} has already folded")]
    AlreadyFolded(usize),
    #[error("seat {0} is already all-in")]
    AlreadyAllIn(usize),
    #[error("provider for seat {0} timed out")]
    Timeout(usize),
    #[error("provider for seat {0} returned a malformed action")]
    MalformedAction(usize),
}

/// Internal invariant violations and external-resource failures. Per
/// spec.md §7 these are always fatal to the hand in progress: the engine
/// aborts, refunds every committed chip, emits `hand:aborted`, and
/// returns the table to a clean WAITING state.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FatalError {
    #[error("chip conservation violated: expected {expected}, observed {observed}")]
    ChipConservationViolated { expected: u64, observed: u64 },
    #[error("seat {0} referenced but not present at the table")]
    MissingSeat(usize),
    #[error("deck exhausted during legal play")]
    DeckExhausted,
    #[error("deck or serialization resource failed: {0}")]
    ResourceFailure(String),
    #[error("no hand is currently in progress")]
    NoHandInProgress,
}

/// Structured outcomes of `Table::try_start_hand`. Never a bare boolean:
/// a caller always learns exactly why a hand did or didn't start.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartRefusal {
    #[error("a hand is already in progress")]
    TableNotReady,
    #[error("fewer than {minimum} players seated ({seated} present)")]
    InsufficientPlayers { seated: usize, minimum: usize },
    #[error("fewer than {minimum} players have chips > 0 ({active} present)")]
    InsufficientActivePlayers { active: usize, minimum: usize },
    #[error("internal engine error, cleanly rolled back: {0}")]
    EngineError(FatalError),
}
