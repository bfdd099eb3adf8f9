//! Player-provider interface (spec.md §6.1): the capability set the
//! Hand Engine calls out to for every decision point, generalized from
//! the teacher's single heads-up `AIOpponent` trait to an arbitrary
//! number of independently addressable seats.
//!
//! Grounded on `rust/ai/src/lib.rs::AIOpponent` (`get_action(&self,
//! engine, player_id) -> PlayerAction`). Two changes from the teacher's
//! shape: the trait takes a [`GameStateView`] + [`BettingDetails`]
//! value rather than `&Engine`, so a provider can never reach back into
//! engine-owned state (spec.md §9's "engine neither caring nor coupling
//! to concrete kinds"); and it adds `receive_private_cards`/
//! `receive_message`, the two notification methods spec.md §6.1
//! requires beyond decision-making. The teacher's `Send + Sync` bound is
//! dropped: spec.md §5 runs one hand engine task per table,
//! single-threaded and cooperative, so nothing here crosses a thread.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::engine::Street;
use crate::player::{PlayerAction, SeatStatus};
use crate::validator::BettingDetails;

/// What the engine discloses about one other seat: never that seat's
/// hole cards (spec.md §6.1: "hole cards of other players are not
/// disclosed").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentView {
    pub chips: u32,
    pub committed_this_round: u32,
    pub status: SeatStatus,
    pub last_action: Option<PlayerAction>,
}

/// The engine's outward view of hand state, sent alongside every
/// `BettingDetails` envelope when a decision is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateView {
    pub phase: Street,
    pub community_cards: Vec<Card>,
    pub pot_total: u32,
    pub current_bet: u32,
    pub players: BTreeMap<String, OpponentView>,
    pub my_id: String,
}

/// The capability set a seat's occupant (human adapter, bot, scripted
/// test agent) must provide. The engine holds only `Box<dyn
/// PlayerProvider>` per seat and never downcasts to a concrete kind.
pub trait PlayerProvider {
    /// Invoked once per decision point. This call is synchronous and the
    /// engine cannot preempt it, so implementations must still return
    /// promptly; the engine times the call against
    /// `TableConfig::action_timeout_ms` and, if it ran over, discards the
    /// returned action in favor of the default-action policy (spec.md
    /// §4.4) instead of applying it.
    fn get_action(&mut self, view: &GameStateView, details: &BettingDetails) -> PlayerAction;

    /// Invoked once per hand when hole cards are dealt.
    fn receive_private_cards(&mut self, cards: [Card; 2]);

    /// Optional, non-blocking informational notification. Default is a
    /// no-op; most providers don't need to react to it.
    fn receive_message(&mut self, _msg: &str) {}
}
