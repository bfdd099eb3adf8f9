//! Event protocol (spec.md §6.2) and the synchronous in-order publisher
//! spec.md §5 requires.
//!
//! Grounded on `rust/web/src/events.rs`'s `EventBus`/`GameEvent` shape
//! (`#[serde(tag = "type", rename_all = "snake_case")]`, per-session
//! subscriber registry), but the teacher's bus fans out over bounded
//! `tokio::mpsc` channels and deliberately **drops** events under
//! backpressure ("implements backpressure by dropping events for slow
//! subscribers"). Spec.md §5 forbids that for a hand engine: handlers
//! must run to completion, in order, before the engine resumes. This
//! version is a plain synchronous `Vec<Box<dyn Subscriber>>` fan-out
//! with no channel, no drop path, and no `Send`/`Sync` requirement,
//! matching the single-threaded-cooperative-per-table model of spec.md §5.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::engine::Street;
use crate::hand::Category;
use crate::player::PlayerAction;
use crate::pot::Pot;
use crate::validator::BettingDetails;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSnapshot {
    pub seat: usize,
    pub player_id: String,
    pub chips_start: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBet {
    pub player_id: String,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerPayload {
    pub player_id: String,
    pub amount: u32,
    pub hand_rank: Option<Category>,
    pub hand_description: String,
    pub best_five: Vec<Card>,
    pub hole_cards: Vec<Card>,
}

/// One emission of the event protocol. Every event carries the four
/// envelope fields spec.md §6.2 mandates; `kind` carries the
/// event-specific payload and doubles as the wire `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub table_id: String,
    pub hand_number: u64,
    pub sequence: u64,
    pub timestamp: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    TableReady {
        seated_count: usize,
        min_players: usize,
    },
    HandStarted {
        hand_number: u64,
        button_seat: usize,
        sb_seat: Option<usize>,
        bb_seat: usize,
        seats: Vec<SeatSnapshot>,
    },
    CardsDealt {
        seats_dealt: Vec<usize>,
    },
    StreetEntered {
        street: Street,
        community_cards: Vec<Card>,
    },
    ActionRequested {
        seat: usize,
        player_id: String,
        betting_details: BettingDetails,
    },
    PlayerAction {
        seat: usize,
        player_id: String,
        action: PlayerAction,
        amount: u32,
        pot_size: u32,
        hand_number: u64,
    },
    PotUpdated {
        player_bet: Option<PlayerBet>,
        pot_total: u32,
        pots: Vec<Pot>,
    },
    ChipsAwarded {
        player_id: String,
        amount: u32,
        total_after: u32,
    },
    PlayerEliminated {
        player_id: String,
        final_chips: u32,
    },
    HandEnded {
        winners: Vec<WinnerPayload>,
        pot_total: u32,
        community_cards: Vec<Card>,
    },
    HandAborted {
        reason: String,
    },
}

/// A handler registered with an [`EventBus`]. `handle` must run to
/// completion and must not attempt to mutate engine state directly
/// (spec.md §5); a handler that wants to start a new hand enqueues a
/// request on the table instead.
pub trait Subscriber {
    fn handle(&mut self, event: &Event);
}

/// Ordered, synchronous publisher. `emit` assigns the next sequence
/// number, stamps the current time, and runs every subscriber to
/// completion, in registration order, before returning — so the engine
/// never resumes work while a handler is still observing a stale event.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Box<dyn Subscriber>>,
    sequence: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    pub fn emit(&mut self, table_id: &str, hand_number: u64, kind: EventKind) -> Event {
        self.sequence += 1;
        let event = Event {
            table_id: table_id.to_string(),
            hand_number,
            sequence: self.sequence,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            kind,
        };
        for subscriber in &mut self.subscribers {
            subscriber.handle(&event);
        }
        event
    }

    pub fn last_sequence(&self) -> u64 {
        self.sequence
    }
}
