//! Hand Evaluator (spec.md §4.2): a pure, total, deterministic function
//! over hole + community cards producing a comparable [`HandRanking`].
//!
//! The category/kicker derivation follows the teacher engine's
//! rank/suit-counting approach; this version additionally threads the
//! actual [`Card`] values through so `best_five` and a human-readable
//! description can be produced, not just a bare category + kicker ranks.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};

/// Hand category, ordered low to high. Matches spec.md §4.2's explicit
/// numbering (`HighCard = 1` .. `StraightFlush = 9`); a royal flush is an
/// Ace-high straight flush and is not a distinct category, per spec.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    HighCard = 1,
    Pair = 2,
    TwoPair = 3,
    Trips = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    Quads = 8,
    StraightFlush = 9,
}

/// The outcome of evaluating a 5-to-7 card pool: a total-ordered
/// category, the kicker ranks used to break ties within a category, the
/// five cards that make up the ranking, and a human description.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRanking {
    pub category: Category,
    /// Kicker ranks high-to-low, used for tiebreaks within a category.
    pub kickers: [u8; 5],
    pub best_five: [Card; 5],
    pub description: String,
}

impl HandRanking {
    fn new(category: Category, kickers: [u8; 5], best_five: [Card; 5]) -> Self {
        let description = describe(category, &kickers);
        Self {
            category,
            kickers,
            best_five,
            description,
        }
    }
}

impl Ord for HandRanking {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.kickers.cmp(&other.kickers))
    }
}

impl PartialOrd for HandRanking {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Evaluates the best 5-card hand from a player's two hole cards plus
/// the community cards revealed so far (0 to 5 of them). The function
/// is only meaningful once at least 5 cards total are available; in
/// practice the engine only calls this at showdown with a full 5-card
/// board.
///
/// # Panics
///
/// Panics if fewer than 5 cards are supplied in total; this is a pure
/// internal function, not a boundary that validates untrusted input.
pub fn evaluate(hole: &[Card; 2], board: &[Card]) -> HandRanking {
    let mut combined: Vec<Card> = Vec::with_capacity(2 + board.len());
    combined.extend_from_slice(hole);
    combined.extend_from_slice(board);
    assert!(
        combined.len() >= 5,
        "evaluate requires at least 5 cards total, got {}",
        combined.len()
    );
    evaluate_cards(&combined)
}

/// Evaluates the best 5-card hand from an arbitrary pool of 5-7 cards.
pub fn evaluate_cards(cards: &[Card]) -> HandRanking {
    let mut rank_counts = [0u8; 15];
    let mut suit_counts = [0u8; 4];
    let mut by_suit: [Vec<Card>; 4] = [vec![], vec![], vec![], vec![]];
    let mut by_rank: Vec<Vec<Card>> = vec![Vec::new(); 15];

    for &c in cards {
        let r = rank_val(c.rank);
        rank_counts[r as usize] += 1;
        let s = suit_index(c.suit);
        suit_counts[s] += 1;
        by_suit[s].push(c);
        by_rank[r as usize].push(c);
    }

    if let Some(s) = flush_suit(&suit_counts) {
        let suited_ranks: Vec<u8> = {
            let mut v: Vec<u8> = by_suit[s].iter().map(|c| rank_val(c.rank)).collect();
            v.sort_unstable();
            v.dedup();
            v
        };
        if let Some(high) = straight_high(&suited_ranks) {
            let five = pick_straight_cards(&by_suit[s], high);
            return HandRanking::new(Category::StraightFlush, [high, 0, 0, 0, 0], five);
        }
    }

    if let Some(quad_rank) = (2..=14).rev().find(|&r| rank_counts[r as usize] == 4) {
        let kicker_rank = (2..=14)
            .rev()
            .find(|&r| r != quad_rank && rank_counts[r as usize] > 0)
            .unwrap_or(0);
        let mut five = [Card::placeholder(); 5];
        for (i, c) in by_rank[quad_rank as usize].iter().take(4).enumerate() {
            five[i] = *c;
        }
        five[4] = card_for_rank(&by_rank, kicker_rank);
        return HandRanking::new(Category::Quads, [quad_rank, kicker_rank, 0, 0, 0], five);
    }

    let trips: Vec<u8> = (2..=14)
        .rev()
        .filter(|&r| rank_counts[r as usize] == 3)
        .collect();
    let pairs: Vec<u8> = (2..=14)
        .rev()
        .filter(|&r| rank_counts[r as usize] == 2)
        .collect();

    if !trips.is_empty() {
        let trip = trips[0];
        if let Some(&pair) = trips.get(1).or_else(|| pairs.first()) {
            let mut five = [Card::placeholder(); 5];
            for (i, c) in by_rank[trip as usize].iter().take(3).enumerate() {
                five[i] = *c;
            }
            for (i, c) in by_rank[pair as usize].iter().take(2).enumerate() {
                five[3 + i] = *c;
            }
            return HandRanking::new(Category::FullHouse, [trip, pair, 0, 0, 0], five);
        }
    }

    if let Some(s) = flush_suit(&suit_counts) {
        let mut cards_in_suit = by_suit[s].clone();
        cards_in_suit.sort_unstable_by(|a, b| rank_val(b.rank).cmp(&rank_val(a.rank)));
        let top5: Vec<Card> = cards_in_suit.into_iter().take(5).collect();
        let kickers = ranks5(&top5);
        let five = to_five(&top5);
        return HandRanking::new(Category::Flush, kickers, five);
    }

    let mut present_ranks: Vec<u8> = (2..=14).filter(|&r| rank_counts[r as usize] > 0).collect();
    present_ranks.sort_unstable();
    if let Some(high) = straight_high(&present_ranks) {
        let five = pick_straight_cards(cards, high);
        return HandRanking::new(Category::Straight, [high, 0, 0, 0, 0], five);
    }

    if !trips.is_empty() {
        let trip = trips[0];
        let mut kickers: Vec<u8> = (2..=14)
            .rev()
            .filter(|&r| r != trip && rank_counts[r as usize] > 0)
            .take(2)
            .collect();
        kickers.resize(2, 0);
        let mut five = [Card::placeholder(); 5];
        for (i, c) in by_rank[trip as usize].iter().take(3).enumerate() {
            five[i] = *c;
        }
        five[3] = card_for_rank(&by_rank, kickers[0]);
        five[4] = card_for_rank(&by_rank, kickers[1]);
        return HandRanking::new(Category::Trips, [trip, kickers[0], kickers[1], 0, 0], five);
    }

    if pairs.len() >= 2 {
        let high = pairs[0];
        let low = pairs[1];
        let kicker = (2..=14)
            .rev()
            .find(|&r| r != high && r != low && rank_counts[r as usize] > 0)
            .unwrap_or(0);
        let mut five = [Card::placeholder(); 5];
        for (i, c) in by_rank[high as usize].iter().take(2).enumerate() {
            five[i] = *c;
        }
        for (i, c) in by_rank[low as usize].iter().take(2).enumerate() {
            five[2 + i] = *c;
        }
        five[4] = card_for_rank(&by_rank, kicker);
        return HandRanking::new(Category::TwoPair, [high, low, kicker, 0, 0], five);
    }

    if let Some(&pair) = pairs.first() {
        let mut kickers: Vec<u8> = (2..=14)
            .rev()
            .filter(|&r| r != pair && rank_counts[r as usize] > 0)
            .take(3)
            .collect();
        kickers.resize(3, 0);
        let mut five = [Card::placeholder(); 5];
        for (i, c) in by_rank[pair as usize].iter().take(2).enumerate() {
            five[i] = *c;
        }
        for (i, &k) in kickers.iter().enumerate() {
            five[2 + i] = card_for_rank(&by_rank, k);
        }
        return HandRanking::new(
            Category::Pair,
            [pair, kickers[0], kickers[1], kickers[2], 0],
            five,
        );
    }

    let mut sorted_cards: Vec<Card> = cards.to_vec();
    sorted_cards.sort_unstable_by(|a, b| rank_val(b.rank).cmp(&rank_val(a.rank)));
    sorted_cards.dedup_by_key(|c| rank_val(c.rank));
    let top5: Vec<Card> = sorted_cards.into_iter().take(5).collect();
    let kickers = ranks5(&top5);
    let five = to_five(&top5);
    HandRanking::new(Category::HighCard, kickers, five)
}

/// Compares two hand rankings: `Greater` means `a` wins.
pub fn compare_hands(a: &HandRanking, b: &HandRanking) -> Ordering {
    a.cmp(b)
}

fn rank_val(r: Rank) -> u8 {
    r as u8
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

fn flush_suit(suit_counts: &[u8; 4]) -> Option<usize> {
    suit_counts.iter().position(|&c| c >= 5)
}

fn card_for_rank(by_rank: &[Vec<Card>], rank: u8) -> Card {
    by_rank[rank as usize].first().copied().unwrap_or(Card::placeholder())
}

fn ranks5(cards: &[Card]) -> [u8; 5] {
    let mut k = [0u8; 5];
    for (i, c) in cards.iter().take(5).enumerate() {
        k[i] = rank_val(c.rank);
    }
    k
}

fn to_five(cards: &[Card]) -> [Card; 5] {
    let mut out = [Card::placeholder(); 5];
    for (i, c) in cards.iter().take(5).enumerate() {
        out[i] = *c;
    }
    out
}

/// Highest rank starting a run of >= 5 consecutive ranks in a sorted,
/// deduplicated ascending slice, treating Ace (14) as also playable low
/// (the A-2-3-4-5 wheel). Returns the straight's high card rank, using
/// 5 (not 14) for the wheel per spec.md §4.2.
fn straight_high(sorted_unique_ranks: &[u8]) -> Option<u8> {
    if sorted_unique_ranks.is_empty() {
        return None;
    }
    let mut w = sorted_unique_ranks.to_vec();
    if w.binary_search(&14).is_ok() {
        w.insert(0, 1);
    }
    let mut run = 1;
    let mut best_high = 0u8;
    for i in 1..w.len() {
        if w[i] == w[i - 1] + 1 {
            run += 1;
            if run >= 5 {
                best_high = w[i];
            }
        } else if w[i] != w[i - 1] {
            run = 1;
        }
    }
    if best_high == 0 {
        None
    } else {
        Some(best_high)
    }
}

/// Picks the 5 actual cards forming a straight with the given high rank
/// out of `pool` (which may contain more than one card per rank; any
/// representative card of each needed rank is used).
fn pick_straight_cards(pool: &[Card], high: u8) -> [Card; 5] {
    let needed: Vec<u8> = if high == 5 {
        vec![14, 2, 3, 4, 5]
    } else {
        ((high - 4)..=high).collect()
    };
    let mut out = [Card::placeholder(); 5];
    for (i, &r) in needed.iter().enumerate() {
        out[i] = pool
            .iter()
            .find(|c| rank_val(c.rank) == r)
            .copied()
            .unwrap_or(Card::placeholder());
    }
    out.sort_unstable_by(|a, b| {
        let ra = if high == 5 && rank_val(a.rank) == 14 {
            1
        } else {
            rank_val(a.rank)
        };
        let rb = if high == 5 && rank_val(b.rank) == 14 {
            1
        } else {
            rank_val(b.rank)
        };
        rb.cmp(&ra)
    });
    out
}

fn rank_plural(v: u8) -> &'static str {
    match v {
        2 => "Twos",
        3 => "Threes",
        4 => "Fours",
        5 => "Fives",
        6 => "Sixes",
        7 => "Sevens",
        8 => "Eights",
        9 => "Nines",
        10 => "Tens",
        11 => "Jacks",
        12 => "Queens",
        13 => "Kings",
        14 => "Aces",
        _ => "Unknown",
    }
}

fn rank_name(v: u8) -> &'static str {
    match v {
        2 => "Two",
        3 => "Three",
        4 => "Four",
        5 => "Five",
        6 => "Six",
        7 => "Seven",
        8 => "Eight",
        9 => "Nine",
        10 => "Ten",
        11 => "Jack",
        12 => "Queen",
        13 => "King",
        14 => "Ace",
        _ => "Unknown",
    }
}

fn describe(category: Category, kickers: &[u8; 5]) -> String {
    match category {
        Category::StraightFlush => {
            if kickers[0] == 14 {
                "Royal Flush".to_string()
            } else {
                format!("Straight Flush, {} high", rank_name(kickers[0]))
            }
        }
        Category::Quads => format!("Four of a Kind, {}", rank_plural(kickers[0])),
        Category::FullHouse => format!(
            "Full House, {} over {}",
            rank_plural(kickers[0]),
            rank_plural(kickers[1])
        ),
        Category::Flush => format!("Flush, {} high", rank_name(kickers[0])),
        Category::Straight => format!("Straight, {} high", rank_name(kickers[0])),
        Category::Trips => format!("Three of a Kind, {}", rank_plural(kickers[0])),
        Category::TwoPair => format!(
            "Two Pair, {} and {}",
            rank_plural(kickers[0]),
            rank_plural(kickers[1])
        ),
        Category::Pair => format!("Pair of {}", rank_plural(kickers[0])),
        Category::HighCard => format!("{} High", rank_name(kickers[0])),
    }
}

impl Card {
    /// An arbitrary, never-user-visible filler card used only to
    /// initialize fixed-size `[Card; 5]` arrays before they are fully
    /// populated by the evaluator.
    fn placeholder() -> Card {
        Card {
            suit: Suit::Clubs,
            rank: Rank::Two,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank as R, Suit as S};

    fn c(s: S, r: R) -> Card {
        Card { suit: s, rank: r }
    }

    #[test]
    fn detects_royal_flush() {
        let hole = [c(S::Hearts, R::Ten), c(S::Hearts, R::Jack)];
        let board = [
            c(S::Hearts, R::Queen),
            c(S::Hearts, R::King),
            c(S::Hearts, R::Ace),
            c(S::Clubs, R::Two),
            c(S::Diamonds, R::Three),
        ];
        let hr = evaluate(&hole, &board);
        assert_eq!(hr.category, Category::StraightFlush);
        assert_eq!(hr.description, "Royal Flush");
    }

    #[test]
    fn category_ordering_is_correct() {
        let quads = evaluate_cards(&[
            c(S::Clubs, R::Ace),
            c(S::Diamonds, R::Ace),
            c(S::Hearts, R::Ace),
            c(S::Spades, R::Ace),
            c(S::Clubs, R::King),
            c(S::Diamonds, R::Queen),
            c(S::Hearts, R::Two),
        ]);
        let full_house = evaluate_cards(&[
            c(S::Clubs, R::King),
            c(S::Diamonds, R::King),
            c(S::Hearts, R::King),
            c(S::Clubs, R::Queen),
            c(S::Diamonds, R::Queen),
            c(S::Hearts, R::Two),
            c(S::Spades, R::Three),
        ]);
        assert!(compare_hands(&quads, &full_house).is_gt());
    }

    #[test]
    fn wheel_straight_ranks_as_five_high() {
        let hr = evaluate_cards(&[
            c(S::Clubs, R::Ace),
            c(S::Hearts, R::Two),
            c(S::Diamonds, R::Three),
            c(S::Spades, R::Four),
            c(S::Clubs, R::Five),
            c(S::Hearts, R::Nine),
            c(S::Diamonds, R::King),
        ]);
        assert_eq!(hr.category, Category::Straight);
        assert_eq!(hr.kickers[0], 5);
    }

    #[test]
    fn two_pair_kicker_breaks_tie() {
        let a = evaluate_cards(&[
            c(S::Clubs, R::Ace),
            c(S::Diamonds, R::Ace),
            c(S::Hearts, R::King),
            c(S::Spades, R::King),
            c(S::Clubs, R::Nine),
            c(S::Diamonds, R::Two),
            c(S::Hearts, R::Three),
        ]);
        let b = evaluate_cards(&[
            c(S::Clubs, R::Ace),
            c(S::Diamonds, R::Ace),
            c(S::Hearts, R::King),
            c(S::Spades, R::King),
            c(S::Clubs, R::Four),
            c(S::Diamonds, R::Two),
            c(S::Hearts, R::Three),
        ]);
        assert!(compare_hands(&a, &b).is_gt());
    }

    #[test]
    fn best_five_has_five_distinct_cards() {
        let hr = evaluate_cards(&[
            c(S::Clubs, R::Ace),
            c(S::Diamonds, R::Ace),
            c(S::Hearts, R::King),
            c(S::Spades, R::King),
            c(S::Clubs, R::Nine),
            c(S::Diamonds, R::Two),
            c(S::Hearts, R::Three),
        ]);
        let unique: std::collections::HashSet<_> = hr.best_five.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn identical_boards_produce_equal_ranking() {
        let board = [
            c(S::Clubs, R::Nine),
            c(S::Hearts, R::Eight),
            c(S::Diamonds, R::Seven),
            c(S::Spades, R::Six),
            c(S::Clubs, R::Two),
        ];
        let a = evaluate(&[c(S::Hearts, R::Five), c(S::Diamonds, R::King)], &board);
        let b = evaluate(&[c(S::Spades, R::Five), c(S::Clubs, R::Queen)], &board);
        assert_eq!(compare_hands(&a, &b), Ordering::Equal);
        assert_eq!(a.category, Category::Straight);
    }
}
