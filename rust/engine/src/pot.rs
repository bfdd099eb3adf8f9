//! Pot Manager (spec.md §4.3): per-seat contribution ledger, layered
//! side-pot construction, and showdown/fold-win distribution with the
//! deterministic odd-chip rule.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::hand::HandRanking;

/// One pot: an amount, the seats still eligible to win it, and the
/// per-seat contribution ceiling (`cap`) that defines its layer.
/// `pots[i].cap < pots[i+1].cap`; eligible sets are monotonically
/// non-increasing with pot index (spec.md §3 invariant 6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: u32,
    pub eligible_seats: BTreeSet<usize>,
    pub cap: u32,
}

/// `(seat, amount)` pairs describing who was paid what.
pub type Distribution = Vec<(usize, u32)>;

/// Tracks every seat's `committed_total` for the hand in progress and
/// materializes the ordered pot list on demand. Folded seats keep
/// contributing to pot *amounts* but are never eligible to win.
#[derive(Debug, Default, Clone)]
pub struct PotManager {
    committed_total: BTreeMap<usize, u32>,
    folded: BTreeSet<usize>,
    pots: Vec<Pot>,
}

impl PotManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records chips moving from a seat into the pool (blind, bet, call,
    /// raise increment, or all-in). Accumulates onto the hand-long total,
    /// not just the current betting round.
    pub fn contribute(&mut self, seat: usize, amount: u32) {
        *self.committed_total.entry(seat).or_insert(0) += amount;
    }

    pub fn mark_folded(&mut self, seat: usize) {
        self.folded.insert(seat);
    }

    pub fn committed_total(&self, seat: usize) -> u32 {
        *self.committed_total.get(&seat).unwrap_or(&0)
    }

    /// Sum of every seat's `committed_total`; used for the
    /// chip-conservation invariant (spec.md §3 invariant 1).
    pub fn total_committed(&self) -> u32 {
        self.committed_total.values().sum()
    }

    /// Recomputes `pots` from the current contributions using the
    /// layered algorithm of spec.md §4.3: sort unique contribution caps,
    /// build one pot per cap level from the slice of each contributor's
    /// commitment between the previous and current cap, and restrict
    /// eligibility to non-folded seats whose commitment reaches the cap.
    pub fn rebuild_pots(&mut self) {
        let mut caps: Vec<u32> = self
            .committed_total
            .values()
            .copied()
            .filter(|&v| v > 0)
            .collect();
        caps.sort_unstable();
        caps.dedup();

        let mut pots = Vec::with_capacity(caps.len());
        let mut prev = 0u32;
        for cap in caps {
            let amount: u32 = self
                .committed_total
                .values()
                .map(|&c| c.min(cap) - c.min(prev))
                .sum();
            if amount > 0 {
                let eligible: BTreeSet<usize> = self
                    .committed_total
                    .iter()
                    .filter(|(seat, &c)| c >= cap && !self.folded.contains(seat))
                    .map(|(&seat, _)| seat)
                    .collect();
                pots.push(Pot {
                    amount,
                    eligible_seats: eligible,
                    cap,
                });
            }
            prev = cap;
        }
        self.pots = pots;
    }

    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    pub fn pot_total(&self) -> u32 {
        self.pots.iter().map(|p| p.amount).sum()
    }

    /// Distributes every pot among its eligible seats by `HandRanking`,
    /// splitting ties evenly and assigning odd remainder chips one at a
    /// time to tied seats starting from the one nearest left of the
    /// button, per spec.md §4.3's odd-chip rule.
    ///
    /// `clockwise_from_button` must enumerate every seat index that may
    /// appear in `rankings`, ordered clockwise starting with the seat
    /// immediately left of the button (so the first entry has first
    /// claim on an odd chip).
    pub fn distribute(
        &self,
        rankings: &BTreeMap<usize, HandRanking>,
        clockwise_from_button: &[usize],
    ) -> Distribution {
        let mut totals: BTreeMap<usize, u32> = BTreeMap::new();
        for pot in &self.pots {
            if pot.amount == 0 || pot.eligible_seats.is_empty() {
                continue;
            }
            let best = pot
                .eligible_seats
                .iter()
                .filter_map(|s| rankings.get(s))
                .max_by(|a, b| a.cmp(b));
            let Some(best) = best else { continue };
            let winners: Vec<usize> = pot
                .eligible_seats
                .iter()
                .copied()
                .filter(|s| {
                    rankings
                        .get(s)
                        .is_some_and(|r| r.cmp(best) == Ordering::Equal)
                })
                .collect();
            if winners.is_empty() {
                continue;
            }
            let share = pot.amount / winners.len() as u32;
            let mut remainder = pot.amount % winners.len() as u32;
            for seat in order_by_clockwise(&winners, clockwise_from_button) {
                let mut amount = share;
                if remainder > 0 {
                    amount += 1;
                    remainder -= 1;
                }
                *totals.entry(seat).or_insert(0) += amount;
            }
        }
        totals.into_iter().collect()
    }

    /// Fold-win shortcut (spec.md §4.3): the sole remaining seat takes
    /// every pot's full amount without a showdown comparison.
    pub fn distribute_fold_win(&self, winner: usize) -> Distribution {
        let total = self.pot_total();
        if total == 0 {
            Vec::new()
        } else {
            vec![(winner, total)]
        }
    }
}

fn order_by_clockwise(seats: &[usize], clockwise_from_button: &[usize]) -> Vec<usize> {
    let mut ordered: Vec<usize> = clockwise_from_button
        .iter()
        .copied()
        .filter(|s| seats.contains(s))
        .collect();
    for &s in seats {
        if !ordered.contains(&s) {
            ordered.push(s);
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Rank, Suit};
    use crate::hand::evaluate_cards;

    fn c(s: Suit, r: Rank) -> Card {
        Card { suit: s, rank: r }
    }

    #[test]
    fn single_pot_when_no_all_in() {
        let mut pm = PotManager::new();
        pm.contribute(0, 50);
        pm.contribute(1, 50);
        pm.contribute(2, 50);
        pm.rebuild_pots();
        assert_eq!(pm.pots().len(), 1);
        assert_eq!(pm.pot_total(), 150);
        assert_eq!(pm.pots()[0].eligible_seats, [0, 1, 2].into_iter().collect());
    }

    #[test]
    fn layered_side_pots_from_uneven_all_ins() {
        // seat 2 all-in for 50, seat 1 all-in for 100, seat 0 covers both at 200.
        let mut pm = PotManager::new();
        pm.contribute(0, 200);
        pm.contribute(1, 100);
        pm.contribute(2, 50);
        pm.rebuild_pots();
        let pots = pm.pots();
        assert_eq!(pots.len(), 3);
        assert_eq!(pots[0].amount, 150); // 50 * 3
        assert_eq!(pots[0].eligible_seats, [0, 1, 2].into_iter().collect());
        assert_eq!(pots[1].amount, 100); // 50 * 2
        assert_eq!(pots[1].eligible_seats, [0, 1].into_iter().collect());
        assert_eq!(pots[2].amount, 100); // 100 * 1 (seat 0 alone above seat 1's cap)
        assert_eq!(pots[2].eligible_seats, [0].into_iter().collect());
        assert_eq!(pm.pot_total(), 350);
    }

    #[test]
    fn folded_contributions_still_fund_pots_but_cannot_win() {
        let mut pm = PotManager::new();
        pm.contribute(0, 100);
        pm.contribute(1, 100);
        pm.mark_folded(1);
        pm.rebuild_pots();
        assert_eq!(pm.pots().len(), 1);
        assert_eq!(pm.pots()[0].amount, 200);
        assert_eq!(pm.pots()[0].eligible_seats, [0].into_iter().collect());
    }

    #[test]
    fn odd_chip_goes_to_seat_left_of_button() {
        let mut pm = PotManager::new();
        pm.contribute(0, 25);
        pm.contribute(1, 25);
        pm.contribute(2, 25);
        pm.rebuild_pots();

        let tied = evaluate_cards(&[
            c(Suit::Clubs, Rank::Ace),
            c(Suit::Diamonds, Rank::Ace),
            c(Suit::Hearts, Rank::King),
            c(Suit::Spades, Rank::Queen),
            c(Suit::Clubs, Rank::Nine),
            c(Suit::Diamonds, Rank::Four),
            c(Suit::Hearts, Rank::Two),
        ]);
        let loser = evaluate_cards(&[
            c(Suit::Clubs, Rank::King),
            c(Suit::Diamonds, Rank::Two),
            c(Suit::Hearts, Rank::King),
            c(Suit::Spades, Rank::Queen),
            c(Suit::Clubs, Rank::Nine),
            c(Suit::Diamonds, Rank::Four),
            c(Suit::Hearts, Rank::Three),
        ]);
        let mut rankings = BTreeMap::new();
        rankings.insert(0, tied.clone());
        rankings.insert(1, tied);
        rankings.insert(2, loser);

        // button = seat 2, so clockwise-from-button order is [0, 1, 2].
        let dist = pm.distribute(&rankings, &[0, 1, 2]);
        let amounts: BTreeMap<usize, u32> = dist.into_iter().collect();
        assert_eq!(amounts.get(&0), Some(&38));
        assert_eq!(amounts.get(&1), Some(&37));
        assert_eq!(amounts.get(&2), None);
    }

    #[test]
    fn fold_win_awards_full_pot_without_showdown() {
        let mut pm = PotManager::new();
        pm.contribute(0, 30);
        pm.contribute(1, 30);
        pm.mark_folded(1);
        pm.rebuild_pots();
        let dist = pm.distribute_fold_win(0);
        assert_eq!(dist, vec![(0, 60)]);
    }
}
