//! Per-seat identity and per-hand state (spec.md §3): the long-lived
//! `Seat` table entry and the `PlayerHandState` that lives and dies with
//! a single hand, plus the wire-stable `PlayerAction` encoding (spec.md
//! §6.1).

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// A convenience default buy-in for tests and examples that don't care
/// about table-specific buy-in bounds; real tables size seats from
/// `TableConfig`.
pub const DEFAULT_STARTING_STACK: u32 = 20_000;

/// A seat's standing at the table, independent of any particular hand.
/// Seat indices are stable for the life of the table (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub seat_index: usize,
    pub player_id: String,
    pub chips: u32,
    pub is_present: bool,
}

impl Seat {
    pub fn new(seat_index: usize, player_id: impl Into<String>, chips: u32) -> Self {
        Self {
            seat_index,
            player_id: player_id.into(),
            chips,
            is_present: true,
        }
    }
}

/// A seat's status within the hand currently in progress.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SeatStatus {
    Active,
    AllIn,
    Folded,
    SittingOut,
}

/// A player's action, as accepted by the Action Validator. The amount
/// convention follows spec.md §6.1 exactly: `Raise` carries the
/// **absolute target** total bet for the round, not an increment, while
/// `Call`/`Bet`/`AllIn` carry increments/absolute-from-zero amounts.
/// This is a deliberate divergence from the teacher's by-increment
/// `Raise(u32)` (and argument-less `Call`/`AllIn`), mandated by spec.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    Fold,
    Check,
    Call(u32),
    Bet(u32),
    Raise(u32),
    AllIn(u32),
}

impl PlayerAction {
    pub fn label(&self) -> &'static str {
        match self {
            PlayerAction::Fold => "FOLD",
            PlayerAction::Check => "CHECK",
            PlayerAction::Call(_) => "CALL",
            PlayerAction::Bet(_) => "BET",
            PlayerAction::Raise(_) => "RAISE",
            PlayerAction::AllIn(_) => "ALL_IN",
        }
    }

    /// The chip amount carried by this action, if any (0 for FOLD/CHECK).
    pub fn amount(&self) -> u32 {
        match self {
            PlayerAction::Fold | PlayerAction::Check => 0,
            PlayerAction::Call(a)
            | PlayerAction::Bet(a)
            | PlayerAction::Raise(a)
            | PlayerAction::AllIn(a) => *a,
        }
    }
}

/// The authoritative per-seat record for the hand currently in
/// progress. Invariant: `chips + committed_total == chips_start` holds
/// for the duration of the hand (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerHandState {
    pub seat_index: usize,
    pub hole_cards: [Option<Card>; 2],
    pub chips_start: u32,
    pub chips: u32,
    pub committed_this_round: u32,
    pub committed_total: u32,
    pub status: SeatStatus,
    pub last_action: Option<PlayerAction>,
    pub has_acted_this_round: bool,
}

impl PlayerHandState {
    pub fn new(seat_index: usize, chips_start: u32) -> Self {
        Self {
            seat_index,
            hole_cards: [None, None],
            chips_start,
            chips: chips_start,
            committed_this_round: 0,
            committed_total: 0,
            status: SeatStatus::Active,
            last_action: None,
            has_acted_this_round: false,
        }
    }

    pub fn give_card(&mut self, c: Card) {
        if self.hole_cards[0].is_none() {
            self.hole_cards[0] = Some(c);
        } else {
            self.hole_cards[1] = Some(c);
        }
    }

    pub fn hole_pair(&self) -> Option<[Card; 2]> {
        match self.hole_cards {
            [Some(a), Some(b)] => Some([a, b]),
            _ => None,
        }
    }

    /// Moves `amount` chips from stack to this round's accumulator. The
    /// caller is responsible for also recording the contribution with
    /// the Pot Manager; this only mutates the per-seat ledger.
    pub fn commit(&mut self, amount: u32) {
        debug_assert!(amount <= self.chips, "committing more than the stack holds");
        self.chips -= amount;
        self.committed_this_round += amount;
        self.committed_total += amount;
        if self.chips == 0 {
            self.status = SeatStatus::AllIn;
        }
    }

    pub fn fold(&mut self) {
        self.status = SeatStatus::Folded;
    }

    pub fn is_folded(&self) -> bool {
        self.status == SeatStatus::Folded
    }

    pub fn is_all_in(&self) -> bool {
        self.status == SeatStatus::AllIn
    }

    pub fn can_act(&self) -> bool {
        matches!(self.status, SeatStatus::Active)
    }

    /// Clears the per-round accumulator once the Betting Round sweeps
    /// committed chips into pots.
    pub fn start_new_round(&mut self) {
        self.committed_this_round = 0;
        self.has_acted_this_round = false;
    }
}
