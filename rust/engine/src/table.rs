//! Table (spec.md §4.8): the thin host around one `SeatTable` and one
//! `HandEngine`. Accepts player additions (refused mid-hand), holds the
//! deck and per-seat providers, and exposes `try_start_hand` returning a
//! structured outcome rather than a bare boolean.
//!
//! Grounded on the teacher's `Engine` (which bundled deck + players +
//! hand state into one owner) generalized to an arbitrary seat count and
//! split so the Hand Engine itself stays stateless between hands; the
//! `Table` is what actually persists across hands.

use std::collections::BTreeMap;

use crate::config::TableConfig;
use crate::deck::Deck;
use crate::engine::{HandEngine, HandResult};
use crate::events::EventBus;
use crate::errors::{SeatError, StartRefusal};
use crate::history::{HandLogger, HandRecord};
use crate::provider::PlayerProvider;
use crate::seats::SeatTable;

/// Successful outcome of [`Table::try_start_hand`].
#[derive(Debug, Clone)]
pub struct StartedHand {
    pub hand_number: u64,
    pub result: HandResult,
}

/// Holds one table's persistent state across hands: seats, the deck,
/// per-seat providers, configuration, and the event bus every hand
/// publishes through. Refuses to seat or unseat players while a hand is
/// in progress.
pub struct Table {
    table_id: String,
    config: TableConfig,
    seats: SeatTable,
    deck: Deck,
    providers: BTreeMap<usize, Box<dyn PlayerProvider>>,
    events: EventBus,
    hand_number: u64,
    hand_in_progress: bool,
    first_hand_played: bool,
    /// JSONL hand-history writer (SPEC_FULL.md §3); absent unless
    /// [`Table::with_history_log`] was called.
    history: Option<HandLogger>,
}

impl Table {
    pub fn new(table_id: impl Into<String>, config: TableConfig) -> Self {
        let capacity = config.max_players;
        Self {
            table_id: table_id.into(),
            config,
            seats: SeatTable::new(capacity),
            deck: Deck::new_random(),
            providers: BTreeMap::new(),
            events: EventBus::new(),
            hand_number: 0,
            hand_in_progress: false,
            first_hand_played: false,
            history: None,
        }
    }

    /// A table whose deck shuffles deterministically from `seed`, for
    /// tests and reproducible simulation runs.
    pub fn new_with_seed(table_id: impl Into<String>, config: TableConfig, seed: u64) -> Self {
        let mut table = Self::new(table_id, config);
        table.deck = Deck::new_with_seed(seed);
        table
    }

    /// Enables hand-history persistence: every hand `try_start_hand` runs
    /// to completion is appended as a JSONL `HandRecord` at `path`
    /// (SPEC_FULL.md §3).
    pub fn with_history_log<P: AsRef<std::path::Path>>(mut self, path: P) -> std::io::Result<Self> {
        self.history = Some(HandLogger::create(path)?);
        Ok(self)
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn seats(&self) -> &SeatTable {
        &self.seats
    }

    /// Seats a player (at a specific seat, or the next open one) and
    /// registers their action provider. Refused while a hand is in
    /// progress, matching spec.md §4.8.
    ///
    /// `try_start_hand` currently runs a hand synchronously end to end,
    /// so no caller can observe `hand_in_progress == true` through the
    /// public API today; the check is kept as the invariant spec.md §4.8
    /// names, so it stays correct the moment a host drives `Table`
    /// re-entrantly (e.g. a provider that calls back into its own table
    /// mid-hand) instead of waiting for `try_start_hand` to return.
    pub fn add_player(
        &mut self,
        at_seat: Option<usize>,
        player_id: impl Into<String>,
        chips: u32,
        provider: Box<dyn PlayerProvider>,
    ) -> Result<usize, SeatError> {
        if self.hand_in_progress {
            return Err(SeatError::HandInProgress);
        }
        let index = self.seats.add_player(at_seat, player_id, chips)?;
        self.providers.insert(index, provider);
        Ok(index)
    }

    /// Unseats a player. Refused while a hand is in progress (see
    /// [`Table::add_player`]'s note on reachability).
    pub fn remove_player(&mut self, index: usize) -> Result<(), SeatError> {
        if self.hand_in_progress {
            return Err(SeatError::HandInProgress);
        }
        self.seats.remove_player(index);
        self.providers.remove(&index);
        Ok(())
    }

    fn participating_seats(&self) -> Vec<usize> {
        self.seats
            .occupied_seats_clockwise()
            .into_iter()
            .filter(|&s| self.seats.seat(s).is_some_and(|seat| seat.chips > 0))
            .collect()
    }

    /// Attempts to start and fully run the next hand. Never returns a
    /// bare boolean: either the hand ran to completion (with its
    /// `HandResult`) or a structured reason explains why it didn't.
    pub fn try_start_hand(&mut self) -> Result<StartedHand, StartRefusal> {
        if self.hand_in_progress {
            return Err(StartRefusal::TableNotReady);
        }

        let seated = self.seats.occupied_count();
        if seated < self.config.min_players {
            return Err(StartRefusal::InsufficientPlayers { seated, minimum: self.config.min_players });
        }
        let active = self.seats.active_count();
        if active < self.config.min_players {
            return Err(StartRefusal::InsufficientActivePlayers { active, minimum: self.config.min_players });
        }

        let participating = self.participating_seats();
        let positions = if self.first_hand_played {
            self.seats.advance()
        } else {
            self.seats.initial_positions()
        };
        let Some(positions) = positions else {
            return Err(StartRefusal::InsufficientPlayers { seated, minimum: self.config.min_players });
        };

        self.hand_in_progress = true;
        self.first_hand_played = true;
        self.hand_number += 1;
        self.deck.shuffle();

        let mut engine = HandEngine::new(self.table_id.clone());
        let outcome = engine.run_hand(
            self.hand_number,
            positions,
            &participating,
            &mut self.seats,
            &mut self.deck,
            &mut self.providers,
            &self.config,
            &mut self.events,
        );

        self.hand_in_progress = false;

        match outcome {
            Ok(result) => {
                self.log_hand(&result);
                Ok(StartedHand { hand_number: self.hand_number, result })
            }
            Err(fatal) => Err(StartRefusal::EngineError(fatal)),
        }
    }

    /// Appends `result` to the hand-history log, if one is configured.
    /// A write failure is logged but never fails the hand itself --
    /// history is an observability feature, not part of the game's
    /// correctness contract.
    fn log_hand(&mut self, result: &HandResult) {
        let Some(logger) = self.history.as_mut() else { return };
        let hand_id = logger.next_id();
        let record = HandRecord {
            hand_id,
            table_id: self.table_id.clone(),
            hand_number: result.hand_number,
            seed: None,
            actions: result.actions.clone(),
            board: result.community_cards.clone(),
            winners: result.winners.clone(),
            pot_total: result.pot_total,
            ts: None,
            showdown: None,
            aborted_reason: None,
        };
        if let Err(err) = logger.write(&record) {
            tracing::warn!(hand_number = result.hand_number, error = %err, "failed to write hand history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;
    use crate::provider::GameStateView;
    use crate::player::PlayerAction;
    use crate::validator::BettingDetails;

    struct AlwaysCheckOrFold;
    impl PlayerProvider for AlwaysCheckOrFold {
        fn get_action(&mut self, _view: &GameStateView, details: &BettingDetails) -> PlayerAction {
            if details.to_call == 0 { PlayerAction::Check } else { PlayerAction::Fold }
        }
        fn receive_private_cards(&mut self, _cards: [Card; 2]) {}
    }

    #[test]
    fn refuses_to_start_below_minimum_players() {
        let mut table = Table::new_with_seed("t1", TableConfig::default(), 1);
        table.add_player(None, "p0", 1000, Box::new(AlwaysCheckOrFold)).unwrap();
        let err = table.try_start_hand().unwrap_err();
        assert!(matches!(err, StartRefusal::InsufficientPlayers { .. }));
    }

    #[test]
    fn runs_a_heads_up_hand_and_reports_started() {
        let mut table = Table::new_with_seed("t1", TableConfig::default(), 7);
        table.add_player(None, "p0", 1000, Box::new(AlwaysCheckOrFold)).unwrap();
        table.add_player(None, "p1", 1000, Box::new(AlwaysCheckOrFold)).unwrap();
        let started = table.try_start_hand().unwrap();
        assert_eq!(started.hand_number, 1);
    }

    #[test]
    fn seating_is_free_again_once_try_start_hand_returns() {
        let mut table = Table::new_with_seed("t1", TableConfig::default(), 7);
        table.add_player(None, "p0", 1000, Box::new(AlwaysCheckOrFold)).unwrap();
        table.add_player(None, "p1", 1000, Box::new(AlwaysCheckOrFold)).unwrap();
        // try_start_hand runs synchronously to completion in this engine,
        // so hand_in_progress is always false by the time it returns.
        table.try_start_hand().unwrap();
        assert!(table.add_player(None, "p2", 1000, Box::new(AlwaysCheckOrFold)).is_ok());
    }

    #[test]
    fn a_completed_hand_is_appended_to_the_configured_history_log() {
        let path = std::env::temp_dir().join(format!("holdem_engine_history_test_{}.jsonl", std::process::id()));
        let mut table = Table::new_with_seed("t1", TableConfig::default(), 7)
            .with_history_log(&path)
            .unwrap();
        table.add_player(None, "p0", 1000, Box::new(AlwaysCheckOrFold)).unwrap();
        table.add_player(None, "p1", 1000, Box::new(AlwaysCheckOrFold)).unwrap();
        table.try_start_hand().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let mut lines = contents.lines();
        let record: crate::history::HandRecord = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(record.table_id, "t1");
        assert_eq!(record.hand_number, 1);
        assert!(lines.next().is_none());
    }

    #[test]
    fn refuses_to_seat_or_unseat_players_while_a_hand_is_in_progress() {
        let mut table = Table::new_with_seed("t1", TableConfig::default(), 7);
        table.add_player(None, "p0", 1000, Box::new(AlwaysCheckOrFold)).unwrap();
        table.add_player(None, "p1", 1000, Box::new(AlwaysCheckOrFold)).unwrap();
        // No caller can set this through the public API today (run_hand is
        // synchronous end to end); flip the private flag directly to
        // exercise the guard itself, as the test module can since it's a
        // descendant of this one.
        table.hand_in_progress = true;
        let err = table.add_player(None, "p2", 1000, Box::new(AlwaysCheckOrFold)).unwrap_err();
        assert_eq!(err, SeatError::HandInProgress);
        let err = table.remove_player(0).unwrap_err();
        assert_eq!(err, SeatError::HandInProgress);
    }
}
