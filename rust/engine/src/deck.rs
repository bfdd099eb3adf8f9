//! Card & Deck (spec.md §4.1): an ordered finite sequence of unique cards
//! with `draw()` and burn semantics, injectable for deterministic tests.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::FatalError;

/// An ordered sequence of cards dealt from front to back. Construct with
/// [`Deck::new_with_seed`] for reproducible shuffles (tests, replay) or
/// [`Deck::new_random`] for a fresh cryptographically-seeded shuffle in
/// production. [`Deck::inject`] bypasses shuffling entirely and is the
/// test hook spec.md §4.1 requires for scripting exact deals.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    /// A deck that will shuffle deterministically from `seed` once
    /// [`shuffle`](Deck::shuffle) is called. Card order is the
    /// unshuffled canonical order until then.
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            cards: full_deck(),
            position: 0,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// A deck seeded from the process's entropy source, for real play.
    pub fn new_random() -> Self {
        Self::new_with_seed(rand::random())
    }

    /// Replace the deck's contents with a specific, caller-chosen card
    /// sequence. Intended for tests that must control exactly which
    /// cards are dealt; `draw()` proceeds front-to-back over `sequence`.
    pub fn inject(&mut self, sequence: Vec<Card>) {
        self.cards = sequence;
        self.position = 0;
    }

    /// Reshuffle a full 52-card deck using this deck's RNG stream.
    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    /// Draw the next card. Drawing past the end of the deck during
    /// legal play cannot happen (52 cards always suffice for up to 10
    /// seats plus burns and the board); if it does, it is a fatal engine
    /// bug, not a recoverable condition, per spec.md §4.1.
    pub fn draw(&mut self) -> Result<Card, FatalError> {
        if self.position >= self.cards.len() {
            return Err(FatalError::DeckExhausted);
        }
        let c = self.cards[self.position];
        self.position += 1;
        Ok(c)
    }

    /// Draw one card and discard it face down without revealing it.
    pub fn burn(&mut self) -> Result<(), FatalError> {
        self.draw().map(|_| ())
    }

    /// Reset to the canonical unshuffled 52-card order.
    pub fn reset(&mut self) {
        self.cards = full_deck();
        self.position = 0;
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}
