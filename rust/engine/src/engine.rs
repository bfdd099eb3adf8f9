//! Hand Engine (spec.md §4.6): the orchestrator that drives one hand
//! from blind posting through showdown or fold-win, wiring together the
//! Card & Deck, Hand Evaluator, Pot Manager, Action Validator, Betting
//! Round and Seat Manager into the exact event sequence spec.md §5/§6
//! mandates.
//!
//! Grounded on the teacher's `engine::Engine`/`HandState`/`apply_action`
//! (same responsibility: own one hand's state, apply a validated action,
//! advance the street), generalized from a hardcoded two-seat game to an
//! arbitrary seat count and from the teacher's by-increment `apply_action`
//! to this spec's absolute-target RAISE convention and multi-way side
//! pots. `blinds_for_level` is carried from the teacher as an optional
//! convenience for callers that want a progressive blind schedule
//! instead of a fixed `TableConfig::blinds`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::betting::{action_order, order_starting_at, seat_after, BettingRound};
use crate::cards::Card;
use crate::config::TableConfig;
use crate::deck::Deck;
use crate::errors::{ActionError, FatalError};
use crate::events::{EventBus, EventKind, PlayerBet, SeatSnapshot, WinnerPayload};
use crate::hand::{evaluate, HandRanking};
use crate::history::ActionRecord;
use crate::player::{PlayerAction, PlayerHandState};
use crate::pot::{Distribution, PotManager};
use crate::provider::{GameStateView, OpponentView, PlayerProvider};
use crate::seats::{Positions, SeatTable};
use crate::validator::{betting_details, validate_action, ActionContext, ValidatedAction};

/// One of a hand's linear phases (spec.md §3). Progression is strictly
/// forward; there is no backtracking.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Complete,
}

/// The authoritative record of one hand in progress (spec.md §3).
/// Destroyed (or archived to `history.rs`) once the hand completes and
/// every event has been emitted.
#[derive(Debug, Clone)]
pub struct HandState {
    pub hand_number: u64,
    pub button_seat: usize,
    pub sb_seat: Option<usize>,
    pub bb_seat: usize,
    pub community_cards: Vec<Card>,
    pub players: BTreeMap<usize, PlayerHandState>,
    pub street: Street,
    pub pot_manager: PotManager,
    pub current_bet: u32,
    pub last_full_raise_size: u32,
    pub action_seat: Option<usize>,
    /// Every decision applied this hand, in order, for hand-history
    /// persistence (`history::HandRecord::actions`).
    pub actions: Vec<ActionRecord>,
}

/// What `HandEngine::run_hand` returns once a hand completes cleanly.
#[derive(Debug, Clone)]
pub struct HandResult {
    pub hand_number: u64,
    pub winners: Vec<WinnerPayload>,
    pub pot_total: u32,
    pub community_cards: Vec<Card>,
    pub eliminated: Vec<usize>,
    pub actions: Vec<ActionRecord>,
}

enum BettingOutcome {
    Continue,
    FoldWin(usize),
}

/// The outcome of a hand's showdown or fold-win resolution, computed and
/// chips already paid out, but with `hand:ended` not yet emitted — the
/// caller must finish elimination bookkeeping first (spec.md §4.6 step 8:
/// `player:eliminated` precedes `hand:ended`).
struct Conclusion {
    winners: Vec<WinnerPayload>,
    pot_total: u32,
    community_cards: Vec<Card>,
    actions: Vec<ActionRecord>,
}

/// Returns the small/big blind amounts for a progressive level schedule.
/// A convenience alternative to a fixed `TableConfig::blinds`; level 0 is
/// treated as level 1 and levels past 20 flatten at level 20's blinds, so
/// the helper never fails on an out-of-range input.
pub fn blinds_for_level(level: u8) -> (u32, u32) {
    match level.max(1) {
        1 => (50, 100),
        2 => (75, 150),
        3 => (100, 200),
        4 => (125, 250),
        5 => (150, 300),
        6 => (200, 400),
        7 => (250, 500),
        8 => (300, 600),
        9 => (400, 800),
        10 => (500, 1000),
        11 => (600, 1200),
        12 => (800, 1600),
        13 => (1000, 2000),
        14 => (1200, 2400),
        15 => (1500, 3000),
        16 => (2000, 4000),
        17 => (2500, 5000),
        18 => (3000, 6000),
        19 => (3500, 7000),
        _ => (4000, 8000),
    }
}

/// Drives exactly one hand to completion. Stateless across hands: every
/// value a run needs is passed into [`HandEngine::run_hand`]; the engine
/// keeps nothing but the table identity used to stamp emitted events.
pub struct HandEngine {
    table_id: String,
}

impl HandEngine {
    pub fn new(table_id: impl Into<String>) -> Self {
        Self { table_id: table_id.into() }
    }

    /// Runs one complete hand per spec.md §4.6's nine-step sequence.
    ///
    /// `participating` lists the seats dealt into this hand (occupied,
    /// not sitting out, chips > 0). `deck` must already be shuffled (or
    /// injected, for tests) by the caller; the engine only draws from
    /// it. `seat_table` supplies each seat's `player_id` and starting
    /// chip count and receives the final chip counts (and eliminations)
    /// back.
    ///
    /// On a fatal internal error every committed chip is refunded before
    /// returning `Err`, so `seat_table` is left exactly as it was found.
    #[allow(clippy::too_many_arguments)]
    pub fn run_hand(
        &mut self,
        hand_number: u64,
        positions: Positions,
        participating: &[usize],
        seat_table: &mut SeatTable,
        deck: &mut Deck,
        providers: &mut BTreeMap<usize, Box<dyn PlayerProvider>>,
        config: &TableConfig,
        events: &mut EventBus,
    ) -> Result<HandResult, FatalError> {
        tracing::info!(hand_number, button = positions.button, "hand starting");

        let pre_hand_total: u32 = participating
            .iter()
            .filter_map(|&s| seat_table.seat(s))
            .map(|s| s.chips)
            .sum();

        let player_ids: BTreeMap<usize, String> = participating
            .iter()
            .filter_map(|&s| seat_table.seat(s).map(|seat| (s, seat.player_id.clone())))
            .collect();

        let mut seats_sorted: Vec<usize> = participating.to_vec();
        seats_sorted.sort_unstable();
        let heads_up = seats_sorted.len() == 2;

        let mut state = HandState {
            hand_number,
            button_seat: positions.button,
            sb_seat: positions.sb,
            bb_seat: positions.bb,
            community_cards: Vec::new(),
            players: seats_sorted
                .iter()
                .map(|&s| {
                    let chips = seat_table.seat(s).map(|seat| seat.chips).unwrap_or(0);
                    (s, PlayerHandState::new(s, chips))
                })
                .collect(),
            street: Street::PreFlop,
            pot_manager: PotManager::new(),
            current_bet: 0,
            last_full_raise_size: config.blinds.big,
            action_seat: None,
            actions: Vec::new(),
        };

        let outcome = self.run_hand_inner(&mut state, &seats_sorted, heads_up, deck, providers, config, events, &player_ids);

        match outcome {
            Ok(conclusion) => {
                self.write_back_chips(&state, seat_table);
                // Eliminations must be known and published before hand:ended
                // (spec.md §4.6 step 8), so chip write-back and elimination
                // detection happen here, ahead of the hand:ended emit below.
                let eliminated = self.apply_eliminations(&state, &seats_sorted, seat_table, events, &player_ids);
                self.check_conservation(pre_hand_total, &seats_sorted, seat_table)?;

                events.emit(
                    &self.table_id,
                    hand_number,
                    EventKind::HandEnded {
                        winners: conclusion.winners.clone(),
                        pot_total: conclusion.pot_total,
                        community_cards: conclusion.community_cards.clone(),
                    },
                );

                tracing::info!(hand_number, pot_total = conclusion.pot_total, "hand complete");
                Ok(HandResult {
                    hand_number,
                    winners: conclusion.winners,
                    pot_total: conclusion.pot_total,
                    community_cards: conclusion.community_cards,
                    eliminated,
                    actions: conclusion.actions,
                })
            }
            Err(err) => {
                tracing::warn!(hand_number, error = %err, "hand aborted, refunding");
                events.emit(&self.table_id, hand_number, EventKind::HandAborted { reason: err.to_string() });
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn run_hand_inner(
        &mut self,
        state: &mut HandState,
        seats_sorted: &[usize],
        heads_up: bool,
        deck: &mut Deck,
        providers: &mut BTreeMap<usize, Box<dyn PlayerProvider>>,
        config: &TableConfig,
        events: &mut EventBus,
        player_ids: &BTreeMap<usize, String>,
    ) -> Result<Conclusion, FatalError> {
        // 1. Post blinds.
        self.post_blinds(state, config, events, player_ids);

        // 2. Deal hole cards, left of the button, clockwise.
        let deal_order = order_starting_at(seats_sorted, seat_after(seats_sorted, state.button_seat));
        self.deal_hole_cards(state, &deal_order, deck, providers)?;
        events.emit(&self.table_id, state.hand_number, EventKind::CardsDealt { seats_dealt: deal_order.clone() });

        // 3. hand:started.
        let seat_snapshots: Vec<SeatSnapshot> = seats_sorted
            .iter()
            .map(|&s| SeatSnapshot {
                seat: s,
                player_id: player_ids[&s].clone(),
                chips_start: state.players[&s].chips_start,
            })
            .collect();
        events.emit(
            &self.table_id,
            state.hand_number,
            EventKind::HandStarted {
                hand_number: state.hand_number,
                button_seat: state.button_seat,
                sb_seat: state.sb_seat,
                bb_seat: state.bb_seat,
                seats: seat_snapshots,
            },
        );

        // 4. Pre-flop betting round.
        if let BettingOutcome::FoldWin(winner) =
            self.run_betting_street(state, Street::PreFlop, seats_sorted, heads_up, providers, config, events, player_ids)?
        {
            return self.settle_fold_win(state, winner, player_ids, events);
        }

        // 5. Flop, turn, river.
        for &(street, reveal) in &[(Street::Flop, 3usize), (Street::Turn, 1), (Street::River, 1)] {
            if self.count_not_folded(state) <= 1 {
                break;
            }
            deck.burn()?;
            for _ in 0..reveal {
                state.community_cards.push(deck.draw()?);
            }
            state.street = street;
            events.emit(
                &self.table_id,
                state.hand_number,
                EventKind::StreetEntered { street, community_cards: state.community_cards.clone() },
            );

            if self.count_can_act(state) >= 2 {
                if let BettingOutcome::FoldWin(winner) =
                    self.run_betting_street(state, street, seats_sorted, heads_up, providers, config, events, player_ids)?
                {
                    return self.settle_fold_win(state, winner, player_ids, events);
                }
            }
            // Otherwise every remaining seat but at most one is all-in:
            // betting is skipped and the loop just reveals the rest of the board.
        }

        // 6/7. Showdown.
        self.showdown_and_distribute(state, seats_sorted, player_ids, events)
    }

    fn post_blinds(
        &mut self,
        state: &mut HandState,
        config: &TableConfig,
        events: &mut EventBus,
        player_ids: &BTreeMap<usize, String>,
    ) {
        if let Some(sb_seat) = state.sb_seat {
            self.post_one_blind(state, sb_seat, config.blinds.small, events, player_ids);
        }
        self.post_one_blind(state, state.bb_seat, config.blinds.big, events, player_ids);
        state.current_bet = state.players.values().map(|p| p.committed_this_round).max().unwrap_or(0);
        state.last_full_raise_size = config.blinds.big;
    }

    fn post_one_blind(
        &mut self,
        state: &mut HandState,
        seat: usize,
        amount: u32,
        events: &mut EventBus,
        player_ids: &BTreeMap<usize, String>,
    ) {
        let Some(player) = state.players.get_mut(&seat) else { return };
        let posted = amount.min(player.chips);
        player.commit(posted);
        state.pot_manager.contribute(seat, posted);
        events.emit(
            &self.table_id,
            state.hand_number,
            EventKind::PotUpdated {
                player_bet: Some(PlayerBet { player_id: player_ids[&seat].clone(), amount: posted }),
                pot_total: state.pot_manager.total_committed(),
                pots: Vec::new(),
            },
        );
    }

    fn deal_hole_cards(
        &mut self,
        state: &mut HandState,
        deal_order: &[usize],
        deck: &mut Deck,
        providers: &mut BTreeMap<usize, Box<dyn PlayerProvider>>,
    ) -> Result<(), FatalError> {
        for _ in 0..2 {
            for &seat in deal_order {
                let card = deck.draw()?;
                let player = state.players.get_mut(&seat).ok_or(FatalError::MissingSeat(seat))?;
                player.give_card(card);
            }
        }
        for &seat in deal_order {
            if let Some(pair) = state.players[&seat].hole_pair() {
                if let Some(provider) = providers.get_mut(&seat) {
                    provider.receive_private_cards(pair);
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn run_betting_street(
        &mut self,
        state: &mut HandState,
        street: Street,
        seats_sorted: &[usize],
        heads_up: bool,
        providers: &mut BTreeMap<usize, Box<dyn PlayerProvider>>,
        config: &TableConfig,
        events: &mut EventBus,
        player_ids: &BTreeMap<usize, String>,
    ) -> Result<BettingOutcome, FatalError> {
        let is_preflop = street == Street::PreFlop;
        let order: Vec<usize> = action_order(is_preflop, heads_up, state.button_seat, state.bb_seat, seats_sorted)
            .into_iter()
            .filter(|s| !state.players[s].is_folded())
            .collect();
        let already_all_in: Vec<usize> = order.iter().copied().filter(|s| state.players[s].is_all_in()).collect();
        let mut round = BettingRound::new(order, state.current_bet, config.blinds.big, already_all_in);

        loop {
            if self.count_not_folded(state) <= 1 {
                let winner = state
                    .players
                    .values()
                    .find(|p| !p.is_folded())
                    .map(|p| p.seat_index)
                    .ok_or(FatalError::MissingSeat(usize::MAX))?;
                return Ok(BettingOutcome::FoldWin(winner));
            }
            if round.is_complete() {
                break;
            }
            let Some(seat) = round.action_seat() else { break };
            state.action_seat = Some(seat);

            let ctx = ActionContext {
                seat_index: seat,
                expected_seat: seat,
                status: state.players[&seat].status,
                player_chips: state.players[&seat].chips,
                committed_this_round: state.players[&seat].committed_this_round,
                current_bet: round.current_bet(),
                last_full_raise_size: round.last_full_raise_size(),
                big_blind: config.blinds.big,
            };
            let details = betting_details(&ctx, state.pot_manager.total_committed());

            events.emit(
                &self.table_id,
                state.hand_number,
                EventKind::ActionRequested { seat, player_id: player_ids[&seat].clone(), betting_details: details.clone() },
            );

            let view = self.game_state_view(state, street, seat, player_ids);
            let provider = providers.get_mut(&seat).ok_or(FatalError::MissingSeat(seat))?;
            let started_at = std::time::Instant::now();
            let requested = provider.get_action(&view, &details);
            let elapsed_ms = started_at.elapsed().as_millis() as u64;

            let validated = if elapsed_ms > config.action_timeout_ms {
                tracing::warn!(
                    seat,
                    elapsed_ms,
                    timeout_ms = config.action_timeout_ms,
                    error = %ActionError::Timeout(seat),
                    "provider missed its action timeout, applying the default action"
                );
                self.default_action(&ctx)
            } else {
                validate_action(&ctx, requested).unwrap_or_else(|_| self.default_action(&ctx))
            };

            self.apply_validated_action(state, &mut round, seat, validated, events, player_ids);
        }

        self.sweep_round(state, config, events);
        state.action_seat = None;
        Ok(BettingOutcome::Continue)
    }

    /// The default-action policy of spec.md §4.4: auto-CHECK if nothing
    /// is owed, else auto-FOLD. Used both when a provider's requested
    /// action fails validation and when it misses `action_timeout_ms`.
    fn default_action(&self, ctx: &ActionContext) -> ValidatedAction {
        let fallback = if ctx.to_call() == 0 { PlayerAction::Check } else { PlayerAction::Fold };
        validate_action(ctx, fallback).expect("default action always validates")
    }

    fn game_state_view(
        &self,
        state: &HandState,
        street: Street,
        seat: usize,
        player_ids: &BTreeMap<usize, String>,
    ) -> GameStateView {
        let players = state
            .players
            .values()
            .map(|p| {
                (
                    player_ids[&p.seat_index].clone(),
                    OpponentView {
                        chips: p.chips,
                        committed_this_round: p.committed_this_round,
                        status: p.status,
                        last_action: p.last_action,
                    },
                )
            })
            .collect();
        GameStateView {
            phase: street,
            community_cards: state.community_cards.clone(),
            pot_total: state.pot_manager.total_committed(),
            current_bet: state.current_bet,
            players,
            my_id: player_ids[&seat].clone(),
        }
    }

    fn apply_validated_action(
        &mut self,
        state: &mut HandState,
        round: &mut BettingRound,
        seat: usize,
        validated: ValidatedAction,
        events: &mut EventBus,
        player_ids: &BTreeMap<usize, String>,
    ) {
        let action = validated.action;
        state.actions.push(ActionRecord { seat, street: state.street, action });
        match action {
            PlayerAction::Fold => {
                if let Some(player) = state.players.get_mut(&seat) {
                    player.fold();
                    player.last_action = Some(action);
                }
                state.pot_manager.mark_folded(seat);
                round.record_fold(seat);
            }
            PlayerAction::Check => {
                if let Some(player) = state.players.get_mut(&seat) {
                    player.has_acted_this_round = true;
                    player.last_action = Some(action);
                }
                round.record_check_or_call(seat);
            }
            PlayerAction::Call(amount) => {
                self.commit_chips(state, seat, amount, action);
                round.record_check_or_call(seat);
            }
            PlayerAction::Bet(_) | PlayerAction::Raise(_) => {
                let old_bet = round.current_bet();
                self.commit_chips(state, seat, validated.chips_moved, action);
                let new_current_bet = state.players[&seat].committed_this_round;
                let increment = new_current_bet.saturating_sub(old_bet);
                round.record_full_raise(seat, new_current_bet, increment);
            }
            PlayerAction::AllIn(amount) => {
                let old_bet = round.current_bet();
                self.commit_chips(state, seat, amount, action);
                let new_current_bet = state.players[&seat].committed_this_round;
                if validated.reopens_betting {
                    let increment = new_current_bet.saturating_sub(old_bet).max(round.last_full_raise_size());
                    round.record_full_raise_all_in(seat, new_current_bet, increment);
                } else {
                    round.record_short_all_in(seat, new_current_bet);
                }
            }
        }

        state.current_bet = round.current_bet();
        state.last_full_raise_size = round.last_full_raise_size();

        events.emit(
            &self.table_id,
            state.hand_number,
            EventKind::PlayerAction {
                seat,
                player_id: player_ids[&seat].clone(),
                action,
                amount: validated.chips_moved,
                pot_size: state.pot_manager.total_committed(),
                hand_number: state.hand_number,
            },
        );
    }

    fn commit_chips(&self, state: &mut HandState, seat: usize, amount: u32, action: PlayerAction) {
        if let Some(player) = state.players.get_mut(&seat) {
            player.commit(amount);
            player.has_acted_this_round = true;
            player.last_action = Some(action);
        }
        state.pot_manager.contribute(seat, amount);
    }

    fn sweep_round(&mut self, state: &mut HandState, config: &TableConfig, events: &mut EventBus) {
        for player in state.players.values_mut() {
            player.start_new_round();
        }
        state.pot_manager.rebuild_pots();
        events.emit(
            &self.table_id,
            state.hand_number,
            EventKind::PotUpdated {
                player_bet: None,
                pot_total: state.pot_manager.pot_total(),
                pots: state.pot_manager.pots().to_vec(),
            },
        );
        state.current_bet = 0;
        state.last_full_raise_size = config.blinds.big;
    }

    /// Resolves a fold win: distributes the pot and reports who won and
    /// how much. Does not emit `hand:ended` — the caller (`run_hand`)
    /// does that only after eliminations are known and published.
    fn settle_fold_win(
        &mut self,
        state: &mut HandState,
        winner: usize,
        player_ids: &BTreeMap<usize, String>,
        events: &mut EventBus,
    ) -> Result<Conclusion, FatalError> {
        state.street = Street::Complete;
        state.pot_manager.rebuild_pots();
        let distribution = state.pot_manager.distribute_fold_win(winner);
        self.apply_distribution(state, &distribution, events, player_ids);

        let winners: Vec<WinnerPayload> = distribution
            .iter()
            .map(|&(seat, amount)| WinnerPayload {
                player_id: player_ids[&seat].clone(),
                amount,
                hand_rank: None,
                hand_description: "Won by fold".to_string(),
                best_five: Vec::new(),
                hole_cards: state.players[&seat].hole_pair().map(|h| h.to_vec()).unwrap_or_default(),
            })
            .collect();
        let pot_total = distribution.iter().map(|&(_, a)| a).sum();

        Ok(Conclusion { winners, pot_total, community_cards: state.community_cards.clone(), actions: state.actions.clone() })
    }

    /// Resolves a showdown: evaluates every live hand, distributes every
    /// pot, and reports the winners. Does not emit `hand:ended` — the
    /// caller (`run_hand`) does that only after eliminations are known
    /// and published.
    fn showdown_and_distribute(
        &mut self,
        state: &mut HandState,
        seats_sorted: &[usize],
        player_ids: &BTreeMap<usize, String>,
        events: &mut EventBus,
    ) -> Result<Conclusion, FatalError> {
        state.street = Street::Showdown;
        state.pot_manager.rebuild_pots();

        let not_folded: Vec<usize> = state.players.values().filter(|p| !p.is_folded()).map(|p| p.seat_index).collect();
        let mut rankings: BTreeMap<usize, HandRanking> = BTreeMap::new();
        for &seat in &not_folded {
            let hole = state.players[&seat].hole_pair().ok_or(FatalError::MissingSeat(seat))?;
            rankings.insert(seat, evaluate(&hole, &state.community_cards));
        }

        let clockwise_from_button = order_starting_at(seats_sorted, seat_after(seats_sorted, state.button_seat));
        let distribution = state.pot_manager.distribute(&rankings, &clockwise_from_button);
        self.apply_distribution(state, &distribution, events, player_ids);

        state.street = Street::Complete;
        let winners: Vec<WinnerPayload> = distribution
            .iter()
            .map(|&(seat, amount)| {
                let ranking = rankings.get(&seat);
                WinnerPayload {
                    player_id: player_ids[&seat].clone(),
                    amount,
                    hand_rank: ranking.map(|r| r.category),
                    hand_description: ranking.map(|r| r.description.clone()).unwrap_or_default(),
                    best_five: ranking.map(|r| r.best_five.to_vec()).unwrap_or_default(),
                    hole_cards: state.players[&seat].hole_pair().map(|h| h.to_vec()).unwrap_or_default(),
                }
            })
            .collect();
        let pot_total: u32 = distribution.iter().map(|&(_, a)| a).sum();

        Ok(Conclusion { winners, pot_total, community_cards: state.community_cards.clone(), actions: state.actions.clone() })
    }

    /// Pays every recipient in `distribution`, aggregated per seat across
    /// every pot it won (rather than one event per pot per recipient;
    /// only the total a seat is owed matters for the invariants spec.md
    /// §8 tests).
    fn apply_distribution(
        &mut self,
        state: &mut HandState,
        distribution: &Distribution,
        events: &mut EventBus,
        player_ids: &BTreeMap<usize, String>,
    ) {
        for &(seat, amount) in distribution {
            if let Some(player) = state.players.get_mut(&seat) {
                player.chips += amount;
            }
            let total_after = state.players.get(&seat).map(|p| p.chips).unwrap_or(0);
            events.emit(
                &self.table_id,
                state.hand_number,
                EventKind::ChipsAwarded { player_id: player_ids[&seat].clone(), amount, total_after },
            );
        }
    }

    fn write_back_chips(&self, state: &HandState, seat_table: &mut SeatTable) {
        for player in state.players.values() {
            if let Some(seat) = seat_table.seat_mut(player.seat_index) {
                seat.chips = player.chips;
            }
        }
    }

    /// Marks every seat left with zero chips as eliminated, in ascending
    /// `chips_start` order with ties broken by clockwise distance from
    /// the button, and emits `player:eliminated` for each — before the
    /// caller emits `hand:ended` (spec.md §4.6 step 8's ordering contract).
    fn apply_eliminations(
        &mut self,
        state: &HandState,
        seats_sorted: &[usize],
        seat_table: &mut SeatTable,
        events: &mut EventBus,
        player_ids: &BTreeMap<usize, String>,
    ) -> Vec<usize> {
        let clockwise = order_starting_at(seats_sorted, seat_after(seats_sorted, state.button_seat));
        let mut eliminated: Vec<usize> = state
            .players
            .values()
            .filter(|p| p.chips == 0)
            .map(|p| p.seat_index)
            .collect();
        eliminated.sort_by_key(|&seat| {
            let chips_start = state.players[&seat].chips_start;
            let distance = clockwise.iter().position(|&s| s == seat).unwrap_or(usize::MAX);
            (chips_start, distance)
        });
        for &seat in &eliminated {
            events.emit(
                &self.table_id,
                state.hand_number,
                EventKind::PlayerEliminated { player_id: player_ids[&seat].clone(), final_chips: 0 },
            );
            seat_table.eliminate(seat);
        }
        eliminated
    }

    fn check_conservation(
        &self,
        pre_hand_total: u32,
        seats_sorted: &[usize],
        seat_table: &SeatTable,
    ) -> Result<(), FatalError> {
        // Eliminated seats held 0 chips by definition, so omitting them
        // from this sum loses nothing.
        let post_hand_total: u32 = seats_sorted.iter().filter_map(|&s| seat_table.seat(s)).map(|s| s.chips).sum();
        if post_hand_total != pre_hand_total {
            return Err(FatalError::ChipConservationViolated {
                expected: pre_hand_total as u64,
                observed: post_hand_total as u64,
            });
        }
        Ok(())
    }

    fn count_not_folded(&self, state: &HandState) -> usize {
        state.players.values().filter(|p| !p.is_folded()).count()
    }

    fn count_can_act(&self, state: &HandState) -> usize {
        state.players.values().filter(|p| p.can_act()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{full_deck, Rank, Suit};
    use crate::validator::BettingDetails;

    struct Scripted {
        actions: std::collections::VecDeque<PlayerAction>,
    }

    impl Scripted {
        fn new(actions: Vec<PlayerAction>) -> Self {
            Self { actions: actions.into() }
        }
    }

    impl PlayerProvider for Scripted {
        fn get_action(&mut self, _view: &GameStateView, details: &BettingDetails) -> PlayerAction {
            self.actions.pop_front().unwrap_or(if details.to_call == 0 { PlayerAction::Check } else { PlayerAction::Fold })
        }
        fn receive_private_cards(&mut self, _cards: [Card; 2]) {}
    }

    fn heads_up_table() -> (SeatTable, BTreeMap<usize, Box<dyn PlayerProvider>>) {
        let mut seats = SeatTable::new(2);
        seats.add_player(Some(0), "p0", 1000).unwrap();
        seats.add_player(Some(1), "p1", 1000).unwrap();
        let mut providers: BTreeMap<usize, Box<dyn PlayerProvider>> = BTreeMap::new();
        providers.insert(0, Box::new(Scripted::new(vec![PlayerAction::Call(0), PlayerAction::Check])));
        providers.insert(1, Box::new(Scripted::new(vec![PlayerAction::Check, PlayerAction::Check])));
        (seats, providers)
    }

    fn rigged_deck() -> Deck {
        let mut deck = Deck::new_with_seed(0);
        let scripted = vec![
            Card { suit: Suit::Spades, rank: Rank::Ace },
            Card { suit: Suit::Hearts, rank: Rank::Ace },
            Card { suit: Suit::Clubs, rank: Rank::King },
            Card { suit: Suit::Diamonds, rank: Rank::Two },
            // burn + flop
            Card { suit: Suit::Clubs, rank: Rank::Two },
            Card { suit: Suit::Spades, rank: Rank::King },
            Card { suit: Suit::Spades, rank: Rank::Queen },
            Card { suit: Suit::Spades, rank: Rank::Jack },
            // burn + turn
            Card { suit: Suit::Clubs, rank: Rank::Three },
            Card { suit: Suit::Spades, rank: Rank::Ten },
            // burn + river
            Card { suit: Suit::Clubs, rank: Rank::Four },
            Card { suit: Suit::Hearts, rank: Rank::Two },
        ];
        deck.inject(scripted.into_iter().chain(full_deck()).collect());
        deck
    }

    #[test]
    fn heads_up_hand_runs_to_showdown_and_conserves_chips() {
        let (mut seats, mut providers) = heads_up_table();
        let positions = seats.initial_positions().unwrap();
        let mut deck = rigged_deck();
        let mut events = EventBus::new();
        let config = TableConfig::default();
        let mut engine = HandEngine::new("t1");

        let result = engine
            .run_hand(1, positions, &[0, 1], &mut seats, &mut deck, &mut providers, &config, &mut events)
            .unwrap();

        assert_eq!(result.pot_total, 200);
        let total: u32 = [0usize, 1].iter().filter_map(|&s| seats.seat(s)).map(|s| s.chips).sum();
        assert_eq!(total, 2000);
    }

    #[test]
    fn fold_preflop_awards_the_pot_without_a_showdown() {
        let mut seats = SeatTable::new(2);
        seats.add_player(Some(0), "p0", 1000).unwrap();
        seats.add_player(Some(1), "p1", 1000).unwrap();
        let mut providers: BTreeMap<usize, Box<dyn PlayerProvider>> = BTreeMap::new();
        providers.insert(0, Box::new(Scripted::new(vec![PlayerAction::Fold])));
        providers.insert(1, Box::new(Scripted::new(vec![])));

        let positions = seats.initial_positions().unwrap();
        let mut deck = rigged_deck();
        let mut events = EventBus::new();
        let config = TableConfig::default();
        let mut engine = HandEngine::new("t1");

        let result = engine
            .run_hand(1, positions, &[0, 1], &mut seats, &mut deck, &mut providers, &config, &mut events)
            .unwrap();

        assert_eq!(result.winners.len(), 1);
        assert_eq!(result.winners[0].hand_description, "Won by fold");
        assert!(result.winners[0].hand_rank.is_none());
    }

    #[test]
    fn blinds_for_level_flattens_at_the_top_and_bottom() {
        assert_eq!(blinds_for_level(0), blinds_for_level(1));
        assert_eq!(blinds_for_level(20), blinds_for_level(21));
        assert_eq!(blinds_for_level(20), blinds_for_level(255));
    }

    struct SlowThenRaise;
    impl PlayerProvider for SlowThenRaise {
        fn get_action(&mut self, _view: &GameStateView, _details: &BettingDetails) -> PlayerAction {
            std::thread::sleep(std::time::Duration::from_millis(5));
            PlayerAction::Raise(1000)
        }
        fn receive_private_cards(&mut self, _cards: [Card; 2]) {}
    }

    #[test]
    fn a_provider_that_misses_its_timeout_gets_the_default_action_instead() {
        let mut seats = SeatTable::new(2);
        seats.add_player(Some(0), "p0", 1000).unwrap();
        seats.add_player(Some(1), "p1", 1000).unwrap();
        let mut providers: BTreeMap<usize, Box<dyn PlayerProvider>> = BTreeMap::new();
        // seat 0 is the button/small blind heads-up, so it acts first
        // pre-flop while still owing the call to the big blind: missing
        // the timeout here must fold it, not apply the requested raise.
        providers.insert(0, Box::new(SlowThenRaise));
        providers.insert(1, Box::new(Scripted::new(vec![])));

        let positions = seats.initial_positions().unwrap();
        let mut deck = rigged_deck();
        let mut events = EventBus::new();
        let mut config = TableConfig::default();
        config.action_timeout_ms = 1;
        let mut engine = HandEngine::new("t1");

        let result = engine
            .run_hand(1, positions, &[0, 1], &mut seats, &mut deck, &mut providers, &config, &mut events)
            .unwrap();

        assert_eq!(result.winners.len(), 1);
        assert_eq!(result.winners[0].player_id, "p1");
        assert_eq!(result.winners[0].hand_description, "Won by fold");
    }
}
