//! Action Validator (spec.md §4.4): canonicalizes a proposed
//! [`PlayerAction`] against the current betting state, decides whether
//! it reopens the betting round to previously-closed seats, and
//! enumerates the `valid_actions` envelope offered to a seat about to
//! act.
//!
//! Generalizes the teacher's `rules::validate_action` (which accepted
//! only `stack`/`to_call`/`min_raise` and a by-increment `Raise(u32)`)
//! to the RAISE-is-absolute-target convention spec.md §6.1 mandates:
//! `PlayerAction::Raise(t)` carries the new `current_bet`, not the
//! increment on top of it. This is a deliberate, spec-directed
//! redesign, not an oversight.

use serde::{Deserialize, Serialize};

use crate::errors::ActionError;
use crate::player::{PlayerAction, SeatStatus};

/// One enumerated entry of the `valid_actions` set (spec.md §4.4).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

/// Everything the Action Validator needs to know about one seat's
/// situation to validate an action or compute its `BettingDetails`.
/// Built by the Betting Round from the current `HandState`.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext {
    pub seat_index: usize,
    pub expected_seat: usize,
    pub status: SeatStatus,
    pub player_chips: u32,
    pub committed_this_round: u32,
    pub current_bet: u32,
    pub last_full_raise_size: u32,
    pub big_blind: u32,
}

impl ActionContext {
    pub fn to_call(&self) -> u32 {
        self.current_bet.saturating_sub(self.committed_this_round)
    }
}

/// The outcome of validating one action: the canonical form to apply
/// (amounts normalized, undersized all-ins folded in), how many chips
/// actually move from stack to pot this turn, and whether the action
/// reopens the round to seats that had already closed their action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedAction {
    pub action: PlayerAction,
    pub chips_moved: u32,
    pub reopens_betting: bool,
}

/// The envelope sent alongside `action:requested` (spec.md §3/§6.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettingDetails {
    pub current_bet: u32,
    pub to_call: u32,
    pub pot_size: u32,
    pub min_raise: u32,
    pub max_raise: u32,
    pub valid_actions: Vec<ActionKind>,
    pub player_chips: u32,
    pub player_committed_this_round: u32,
}

/// Validates and canonicalizes a proposed action. Rejections are never
/// fatal (spec.md §4.4): the caller falls back to the default-action
/// policy (`to_call == 0` → auto-CHECK, else auto-FOLD).
pub fn validate_action(
    ctx: &ActionContext,
    action: PlayerAction,
) -> Result<ValidatedAction, ActionError> {
    if ctx.seat_index != ctx.expected_seat {
        return Err(ActionError::NotSeatsTurn {
            expected: ctx.expected_seat,
            actual: ctx.seat_index,
        });
    }
    if ctx.status == SeatStatus::Folded {
        return Err(ActionError::AlreadyFolded(ctx.seat_index));
    }
    if ctx.status == SeatStatus::AllIn {
        return Err(ActionError::AlreadyAllIn(ctx.seat_index));
    }

    let to_call = ctx.to_call();

    match action {
        PlayerAction::Fold => Ok(ValidatedAction {
            action: PlayerAction::Fold,
            chips_moved: 0,
            reopens_betting: false,
        }),

        PlayerAction::Check => {
            if to_call == 0 {
                Ok(ValidatedAction {
                    action: PlayerAction::Check,
                    chips_moved: 0,
                    reopens_betting: false,
                })
            } else {
                Err(ActionError::CannotCheckFacingBet)
            }
        }

        PlayerAction::Call(_) => {
            if to_call == 0 {
                return Err(ActionError::InvalidBetAmount {
                    amount: 0,
                    minimum: 1,
                });
            }
            let amount = to_call.min(ctx.player_chips);
            if amount == ctx.player_chips && ctx.player_chips < to_call {
                Ok(ValidatedAction {
                    action: PlayerAction::AllIn(amount),
                    chips_moved: amount,
                    reopens_betting: false,
                })
            } else {
                Ok(ValidatedAction {
                    action: PlayerAction::Call(amount),
                    chips_moved: amount,
                    reopens_betting: false,
                })
            }
        }

        PlayerAction::Bet(a) => {
            if ctx.current_bet != 0 {
                return Err(ActionError::InvalidBetAmount {
                    amount: a,
                    minimum: ctx.current_bet,
                });
            }
            if a == 0 || a > ctx.player_chips {
                return Err(ActionError::InvalidBetAmount {
                    amount: a,
                    minimum: ctx.big_blind,
                });
            }
            if a < ctx.big_blind && a < ctx.player_chips {
                return Err(ActionError::InvalidBetAmount {
                    amount: a,
                    minimum: ctx.big_blind,
                });
            }
            if a == ctx.player_chips {
                Ok(ValidatedAction {
                    action: PlayerAction::AllIn(a),
                    chips_moved: a,
                    reopens_betting: true,
                })
            } else {
                Ok(ValidatedAction {
                    action: PlayerAction::Bet(a),
                    chips_moved: a,
                    reopens_betting: true,
                })
            }
        }

        PlayerAction::Raise(target) => {
            if ctx.current_bet == 0 {
                return Err(ActionError::InvalidBetAmount {
                    amount: target,
                    minimum: ctx.big_blind,
                });
            }
            let needed = target.saturating_sub(ctx.committed_this_round);
            if needed >= ctx.player_chips {
                return Ok(ValidatedAction {
                    action: PlayerAction::AllIn(ctx.player_chips),
                    chips_moved: ctx.player_chips,
                    reopens_betting: reopens(
                        ctx.committed_this_round + ctx.player_chips,
                        ctx.current_bet,
                        ctx.last_full_raise_size,
                    ),
                });
            }
            let increment = target.saturating_sub(ctx.current_bet);
            if increment < ctx.last_full_raise_size {
                return Err(ActionError::InvalidBetAmount {
                    amount: target,
                    minimum: ctx.current_bet + ctx.last_full_raise_size,
                });
            }
            Ok(ValidatedAction {
                action: PlayerAction::Raise(target),
                chips_moved: needed,
                reopens_betting: true,
            })
        }

        PlayerAction::AllIn(_) => {
            let amount = ctx.player_chips;
            let new_total = ctx.committed_this_round + amount;
            Ok(ValidatedAction {
                action: PlayerAction::AllIn(amount),
                chips_moved: amount,
                reopens_betting: reopens(new_total, ctx.current_bet, ctx.last_full_raise_size),
            })
        }
    }
}

fn reopens(new_total_committed: u32, current_bet: u32, last_full_raise_size: u32) -> bool {
    if new_total_committed <= current_bet {
        return false;
    }
    new_total_committed - current_bet >= last_full_raise_size
}

/// Enumerates which actions are currently legal for a seat, for the
/// `valid_actions` field of [`BettingDetails`]. Spec.md §8 scenario S5
/// depends on RAISE being absent once a short all-in has closed the
/// raising option for a seat that already has a live bet in.
pub fn valid_actions(ctx: &ActionContext) -> Vec<ActionKind> {
    let to_call = ctx.to_call();
    let mut kinds = vec![ActionKind::Fold];

    if to_call == 0 {
        kinds.push(ActionKind::Check);
        if ctx.player_chips > 0 {
            kinds.push(ActionKind::Bet);
        }
    } else {
        kinds.push(ActionKind::Call);
        let min_raise_target = ctx.current_bet + ctx.last_full_raise_size;
        let max_raise_target = ctx.committed_this_round + ctx.player_chips;
        if ctx.player_chips > to_call && max_raise_target >= min_raise_target {
            kinds.push(ActionKind::Raise);
        }
    }
    if ctx.player_chips > 0 {
        kinds.push(ActionKind::AllIn);
    }
    kinds
}

/// Builds the `BettingDetails` envelope published with `action:requested`.
pub fn betting_details(ctx: &ActionContext, pot_size: u32) -> BettingDetails {
    let to_call = ctx.to_call();
    let min_raise = if ctx.current_bet == 0 {
        ctx.big_blind
    } else {
        ctx.current_bet + ctx.last_full_raise_size
    };
    let max_raise = ctx.committed_this_round + ctx.player_chips;
    BettingDetails {
        current_bet: ctx.current_bet,
        to_call,
        pot_size,
        min_raise,
        max_raise,
        valid_actions: valid_actions(ctx),
        player_chips: ctx.player_chips,
        player_committed_this_round: ctx.committed_this_round,
    }
}
