//! # Poker Hand Engine
//!
//! A deterministic, event-driven No-Limit Texas Hold'em engine for 2-10
//! seats. One [`table::Table`] hosts repeated hands; each hand is run to
//! completion by the stateless [`engine::HandEngine`], publishing every
//! state transition as an ordered event through an [`events::EventBus`]
//! and delegating every decision to a seat's [`provider::PlayerProvider`].
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Deterministic deck shuffling with a seeded ChaCha20 RNG
//! - [`hand`] - Seven-card hand evaluation and strength comparison
//! - [`pot`] - Side-pot construction and showdown/fold-win distribution
//! - [`validator`] - Action legality checks and the default-action policy
//! - [`betting`] - One street's betting-round order and completion rule
//! - [`seats`] - The stable seat table and dead-button/dead-blind rotation
//! - [`player`] - Per-seat hand state, actions, and stack bookkeeping
//! - [`engine`] - Orchestrates one hand from blinds to distribution
//! - [`events`] - The event protocol and its synchronous, ordered bus
//! - [`provider`] - The decision/notification interface a seat implements
//! - [`table`] - The persistent host: seating, deck, and hand sequencing
//! - [`history`] - JSONL hand-history persistence
//! - [`config`] - Per-table configuration and validation
//! - [`errors`] - Error taxonomy for actions, fatal faults, and start refusals
//!
//! ## Quick Start
//!
//! ```rust
//! use holdem_engine::cards::{Card, Rank, Suit};
//! use holdem_engine::hand::evaluate_cards;
//!
//! // Evaluate a 7-card poker hand
//! let cards = [
//!     Card { suit: Suit::Hearts, rank: Rank::Ace },
//!     Card { suit: Suit::Hearts, rank: Rank::King },
//!     Card { suit: Suit::Hearts, rank: Rank::Queen },
//!     Card { suit: Suit::Hearts, rank: Rank::Jack },
//!     Card { suit: Suit::Hearts, rank: Rank::Ten },
//!     Card { suit: Suit::Clubs, rank: Rank::Two },
//!     Card { suit: Suit::Diamonds, rank: Rank::Three },
//! ];
//!
//! let ranking = evaluate_cards(&cards);
//! println!("Hand category: {:?}", ranking.category);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! All game outcomes are reproducible using seeded RNG:
//!
//! ```rust
//! use holdem_engine::deck::Deck;
//!
//! // Same seed produces same shuffle
//! let deck1 = Deck::new_with_seed(42);
//! let deck2 = Deck::new_with_seed(42);
//! // deck1 and deck2 will have identical card order
//! ```

pub mod betting;
pub mod cards;
pub mod config;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod events;
pub mod hand;
pub mod history;
pub mod player;
pub mod pot;
pub mod provider;
pub mod seats;
pub mod table;
pub mod validator;
