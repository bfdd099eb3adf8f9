//! Three-handed hand with two simultaneous all-ins: exercises layered
//! side-pot construction, showdown distribution, and the elimination-
//! before-hand-ended event ordering end to end through `HandEngine`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use holdem_engine::cards::{full_deck, Card, Rank, Suit};
use holdem_engine::config::TableConfig;
use holdem_engine::deck::Deck;
use holdem_engine::engine::HandEngine;
use holdem_engine::events::{Event, EventBus, EventKind, Subscriber};
use holdem_engine::player::PlayerAction;
use holdem_engine::provider::{GameStateView, PlayerProvider};
use holdem_engine::seats::SeatTable;
use holdem_engine::validator::BettingDetails;

struct AllInThenFold(bool);

impl PlayerProvider for AllInThenFold {
    fn get_action(&mut self, _view: &GameStateView, details: &BettingDetails) -> PlayerAction {
        if self.0 {
            self.0 = false;
            PlayerAction::AllIn(0)
        } else if details.to_call == 0 {
            PlayerAction::Check
        } else {
            PlayerAction::Fold
        }
    }
    fn receive_private_cards(&mut self, _cards: [Card; 2]) {}
}

fn c(s: Suit, r: Rank) -> Card {
    Card { suit: s, rank: r }
}

/// Deals seat0=AA, seat1=KK, seat2=22 (deal order is [1, 2, 0], left of
/// the button), then a dry 9-8-7 / 3 / 4 board that never pairs or
/// straightens with any of the three hole pairs.
fn rigged_deck() -> Deck {
    let mut deck = Deck::new_with_seed(0);
    let scripted = vec![
        c(Suit::Clubs, Rank::King),
        c(Suit::Clubs, Rank::Two),
        c(Suit::Clubs, Rank::Ace),
        c(Suit::Diamonds, Rank::King),
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Diamonds, Rank::Ace),
        c(Suit::Clubs, Rank::Five), // burn
        c(Suit::Hearts, Rank::Nine),
        c(Suit::Spades, Rank::Eight),
        c(Suit::Diamonds, Rank::Seven),
        c(Suit::Clubs, Rank::Six), // burn
        c(Suit::Hearts, Rank::Three),
        c(Suit::Clubs, Rank::Nine), // burn
        c(Suit::Spades, Rank::Four),
    ];
    deck.inject(scripted.into_iter().chain(full_deck()).collect());
    deck
}

struct Recorder(Rc<RefCell<Vec<&'static str>>>);
impl Subscriber for Recorder {
    fn handle(&mut self, event: &Event) {
        let tag = match &event.kind {
            EventKind::TableReady { .. } => "table_ready",
            EventKind::HandStarted { .. } => "hand_started",
            EventKind::CardsDealt { .. } => "cards_dealt",
            EventKind::StreetEntered { .. } => "street_entered",
            EventKind::ActionRequested { .. } => "action_requested",
            EventKind::PlayerAction { .. } => "player_action",
            EventKind::PotUpdated { .. } => "pot_updated",
            EventKind::ChipsAwarded { .. } => "chips_awarded",
            EventKind::PlayerEliminated { .. } => "player_eliminated",
            EventKind::HandEnded { .. } => "hand_ended",
            EventKind::HandAborted { .. } => "hand_aborted",
        };
        self.0.borrow_mut().push(tag);
    }
}

#[test]
fn layered_side_pots_resolve_and_eliminations_precede_hand_ended() {
    let mut seats = SeatTable::new(3);
    seats.add_player(Some(0), "p0", 1000).unwrap();
    seats.add_player(Some(1), "p1", 1000).unwrap();
    seats.add_player(Some(2), "p2", 300).unwrap();
    let positions = seats.initial_positions().unwrap();
    assert_eq!(positions.button, 0);
    assert_eq!(positions.sb, Some(1));
    assert_eq!(positions.bb, 2);

    let mut providers: BTreeMap<usize, Box<dyn PlayerProvider>> = BTreeMap::new();
    providers.insert(0, Box::new(AllInThenFold(true)));
    providers.insert(1, Box::new(AllInThenFold(true)));
    providers.insert(2, Box::new(AllInThenFold(true)));

    let mut deck = rigged_deck();
    let mut events = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    events.subscribe(Box::new(Recorder(seen.clone())));
    let config = TableConfig::default();
    let mut engine = HandEngine::new("t1");

    let result = engine
        .run_hand(1, positions, &[0, 1, 2], &mut seats, &mut deck, &mut providers, &config, &mut events)
        .unwrap();

    // seat0 (pocket aces) wins both the main pot (300*3=900) and the
    // side pot between seat0/seat1 ((1000-300)*2=1400): 2300 total.
    assert_eq!(result.pot_total, 2300);
    assert_eq!(result.winners.len(), 1);
    assert_eq!(result.winners[0].player_id, "p0");
    assert_eq!(result.winners[0].amount, 2300);

    // both seat1 and seat2 busted; ascending chips_start orders seat2 (300) first.
    assert_eq!(result.eliminated, vec![2, 1]);

    let seat0_chips = seats.seat(0).map(|s| s.chips).unwrap_or(0);
    assert_eq!(seat0_chips, 2300);
    assert!(seats.seat(1).is_none());
    assert!(seats.seat(2).is_none());

    let tags = seen.borrow();
    let first_eliminated = tags.iter().position(|&t| t == "player_eliminated").unwrap();
    let hand_ended = tags.iter().position(|&t| t == "hand_ended").unwrap();
    assert!(first_eliminated < hand_ended, "eliminations must be emitted before hand_ended");
    assert_eq!(tags.iter().filter(|&&t| t == "player_eliminated").count(), 2);
}
