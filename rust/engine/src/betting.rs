//! Betting Round (spec.md §4.5): one street's action order, current
//! bet, last-full-raise tracking, and round-termination detection.
//!
//! Grounded on the teacher's `engine::BettingRound` (current bet,
//! per-player folded/all-in flags, action counting), generalized from a
//! fixed two-seat array to an arbitrary ordered list of seats and from
//! two hardcoded action-order branches to the three cases spec.md §4.5
//! names explicitly.

use std::collections::BTreeSet;

/// Rotates `seats_clockwise` so it begins with `first_actor` and wraps
/// around exactly once. `first_actor` must be present in the slice.
pub fn order_starting_at(seats_clockwise: &[usize], first_actor: usize) -> Vec<usize> {
    let pos = seats_clockwise
        .iter()
        .position(|&s| s == first_actor)
        .unwrap_or(0);
    let n = seats_clockwise.len();
    (0..n).map(|i| seats_clockwise[(pos + i) % n]).collect()
}

/// The seat immediately clockwise of `seat` within `seats_clockwise`.
pub fn seat_after(seats_clockwise: &[usize], seat: usize) -> usize {
    let pos = seats_clockwise
        .iter()
        .position(|&s| s == seat)
        .unwrap_or(0);
    let n = seats_clockwise.len();
    seats_clockwise[(pos + 1) % n]
}

/// Computes the acting order for one street per spec.md §4.5:
/// pre-flop starts left of the big blind (UTG), post-flop starts left
/// of the button, and heads-up reverses this (button/SB acts first
/// pre-flop, the other seat acts first post-flop).
pub fn action_order(
    is_preflop: bool,
    heads_up: bool,
    button_seat: usize,
    bb_seat: usize,
    seats_clockwise: &[usize],
) -> Vec<usize> {
    let first_actor = if heads_up {
        if is_preflop {
            button_seat
        } else {
            seat_after(seats_clockwise, button_seat)
        }
    } else if is_preflop {
        seat_after(seats_clockwise, bb_seat)
    } else {
        seat_after(seats_clockwise, button_seat)
    };
    order_starting_at(seats_clockwise, first_actor)
}

/// Tracks one street's betting state: whose turn it is, the bet every
/// live seat must match, the minimum raise increment, and whether every
/// seat still able to act has closed its action at the current reopen
/// generation.
#[derive(Debug, Clone)]
pub struct BettingRound {
    order: Vec<usize>,
    current_bet: u32,
    last_full_raise_size: u32,
    acted: BTreeSet<usize>,
    folded: BTreeSet<usize>,
    all_in: BTreeSet<usize>,
    action_seat: Option<usize>,
    reopen_generation: u32,
}

impl BettingRound {
    /// `order` is the full clockwise acting order for this street
    /// (every seat still in the hand, whether or not already all-in).
    /// `already_all_in` marks seats that entered the street all-in from
    /// a previous street and so never get to act.
    pub fn new(
        order: Vec<usize>,
        current_bet: u32,
        big_blind: u32,
        already_all_in: impl IntoIterator<Item = usize>,
    ) -> Self {
        let mut round = Self {
            order,
            current_bet,
            last_full_raise_size: big_blind,
            acted: BTreeSet::new(),
            folded: BTreeSet::new(),
            all_in: already_all_in.into_iter().collect(),
            action_seat: None,
            reopen_generation: 0,
        };
        round.advance_action_seat();
        round
    }

    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }

    pub fn last_full_raise_size(&self) -> u32 {
        self.last_full_raise_size
    }

    pub fn action_seat(&self) -> Option<usize> {
        self.action_seat
    }

    pub fn reopen_generation(&self) -> u32 {
        self.reopen_generation
    }

    fn eligible_to_act(&self, seat: usize) -> bool {
        !self.folded.contains(&seat) && !self.all_in.contains(&seat)
    }

    fn advance_action_seat(&mut self) {
        if self.order.is_empty() {
            self.action_seat = None;
            return;
        }
        let n = self.order.len();
        let start = match self.action_seat {
            Some(s) => self
                .order
                .iter()
                .position(|&x| x == s)
                .map(|i| (i + 1) % n)
                .unwrap_or(0),
            None => 0,
        };
        for offset in 0..n {
            let idx = (start + offset) % n;
            let seat = self.order[idx];
            if self.eligible_to_act(seat) {
                self.action_seat = Some(seat);
                return;
            }
        }
        self.action_seat = None;
    }

    pub fn record_fold(&mut self, seat: usize) {
        self.folded.insert(seat);
        self.acted.insert(seat);
        self.advance_action_seat();
    }

    pub fn record_check_or_call(&mut self, seat: usize) {
        self.acted.insert(seat);
        self.advance_action_seat();
    }

    /// A fresh bet or a full raise: sets the new bet level, resets the
    /// minimum raise increment, and reopens action to every seat still
    /// live (spec.md §4.4/§4.5's "reopen the betting").
    pub fn record_full_raise(&mut self, seat: usize, new_current_bet: u32, new_min_raise: u32) {
        self.current_bet = new_current_bet;
        self.last_full_raise_size = new_min_raise;
        self.reopen_generation += 1;
        self.acted.clear();
        self.acted.insert(seat);
        self.advance_action_seat();
    }

    /// An all-in that either doesn't raise the bet at all or raises it
    /// by less than a full increment. Spec.md §4.4/§8 invariant 6: seats
    /// that already closed their action at the prior level are not
    /// reopened *for a raise* — `last_full_raise_size` is left untouched,
    /// so the Action Validator still refuses a new raise from them — but
    /// if the bet level itself increased they still owe the difference
    /// and must be offered CALL/FOLD again (spec.md §4.5's "every live
    /// seat has matched the current bet" termination rule; scenario S5).
    pub fn record_short_all_in(&mut self, seat: usize, new_current_bet: u32) {
        self.all_in.insert(seat);
        if new_current_bet > self.current_bet {
            self.current_bet = new_current_bet;
            self.acted.clear();
        }
        self.acted.insert(seat);
        self.advance_action_seat();
    }

    /// An all-in that reopens the round exactly like a full raise, but
    /// the seat itself cannot act again (it has no chips left).
    pub fn record_full_raise_all_in(&mut self, seat: usize, new_current_bet: u32, new_min_raise: u32) {
        self.all_in.insert(seat);
        self.record_full_raise(seat, new_current_bet, new_min_raise);
    }

    /// True once every seat that can still act has acted since the
    /// current bet was last set — by a full raise (which clears `acted`
    /// and reopens the round) or by a short all-in that raised the bet
    /// without reopening it (which also clears `acted`, so the still-live
    /// seats are forced to call or fold the new amount without being
    /// allowed to raise again). Zero or one seat able to act also closes
    /// the round once that seat (if any) has acted — covering the
    /// fold-to-one-seat and everyone-else-all-in cases without
    /// special-casing them.
    pub fn is_complete(&self) -> bool {
        self.order
            .iter()
            .filter(|s| self.eligible_to_act(**s))
            .all(|s| self.acted.contains(s))
    }

    pub fn folded_seats(&self) -> &BTreeSet<usize> {
        &self.folded
    }

    pub fn all_in_seats(&self) -> &BTreeSet<usize> {
        &self.all_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflop_order_starts_at_utg() {
        // button=0, sb=1, bb=2, utg=3, in a 4-handed game.
        let order = action_order(true, false, 0, 2, &[0, 1, 2, 3]);
        assert_eq!(order, vec![3, 0, 1, 2]);
    }

    #[test]
    fn postflop_order_starts_left_of_button() {
        let order = action_order(false, false, 0, 2, &[0, 1, 2, 3]);
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn heads_up_button_acts_first_preflop() {
        let order = action_order(true, true, 0, 1, &[0, 1]);
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn heads_up_non_button_acts_first_postflop() {
        let order = action_order(false, true, 0, 1, &[0, 1]);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn round_closes_once_all_live_seats_have_acted_at_equal_bet() {
        let mut r = BettingRound::new(vec![0, 1, 2], 20, 20, []);
        assert!(!r.is_complete());
        r.record_check_or_call(0);
        r.record_check_or_call(1);
        assert!(!r.is_complete());
        r.record_check_or_call(2);
        assert!(r.is_complete());
    }

    #[test]
    fn full_raise_reopens_action_for_earlier_callers() {
        let mut r = BettingRound::new(vec![0, 1, 2], 20, 20, []);
        r.record_check_or_call(0);
        r.record_full_raise(1, 60, 40);
        // seat 0 already acted this street but must act again post-raise.
        assert!(!r.is_complete());
        r.record_check_or_call(2);
        r.record_check_or_call(0);
        assert!(r.is_complete());
    }

    #[test]
    fn short_all_in_forces_already_closed_seats_to_call_or_fold_the_new_amount() {
        let mut r = BettingRound::new(vec![0, 1, 2], 300, 100, []);
        r.record_check_or_call(0);
        r.record_check_or_call(1);
        // seat 2 jams for less than a full raise over 300.
        r.record_short_all_in(2, 320);
        // seats 0 and 1 already closed at 300 but now owe the extra 20 and
        // must be offered CALL/FOLD again, even though they can't raise.
        assert!(!r.is_complete());
        assert_eq!(r.action_seat(), Some(0));
        r.record_check_or_call(0);
        assert!(!r.is_complete());
        r.record_check_or_call(1);
        assert!(r.is_complete());
    }

    #[test]
    fn fold_to_one_seat_closes_round_immediately() {
        let mut r = BettingRound::new(vec![0, 1, 2], 20, 20, []);
        r.record_fold(0);
        r.record_fold(1);
        assert!(r.is_complete());
    }
}
