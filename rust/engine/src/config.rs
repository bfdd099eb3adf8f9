//! Per-table configuration (spec.md §6.3), following the teacher CLI's
//! `Config`/`ConfigError` shape (`rust/cli/src/config.rs`): a plain
//! `serde`-derived struct with a hand-written `Default` and a
//! `validate()` pass, scaled from a single-match's settings to a whole
//! table's. Loading from a file or environment is a host/CLI concern and
//! stays outside this crate; this module only defines and validates the
//! struct.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Small/big blind amounts for a table. Kept as its own type (rather
/// than two bare fields) so `blinds_for_level`-style schedules and fixed
/// configs share the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blinds {
    pub small: u32,
    pub big: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub blinds: Blinds,
    pub min_players: usize,
    pub max_players: usize,
    pub min_buy_in: u32,
    pub max_buy_in: u32,
    pub action_timeout_ms: u64,
    /// Elides real-time delay hooks while preserving event ordering and
    /// invariants (spec.md §5); this synchronous core has no delay hooks
    /// of its own, so the flag is a no-op toggle recorded for a host
    /// process that layers timing on top.
    pub simulation_mode: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            blinds: Blinds { small: 50, big: 100 },
            min_players: 2,
            max_players: 9,
            min_buy_in: 2_000,
            max_buy_in: 40_000,
            action_timeout_ms: 30_000,
            simulation_mode: false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("blinds must be positive and small < big (got small={small}, big={big})")]
    InvalidBlinds { small: u32, big: u32 },
    #[error("min_players must be at least 2 (got {0})")]
    MinPlayersTooLow(usize),
    #[error("max_players ({max}) must be >= min_players ({min})")]
    MaxBelowMin { min: usize, max: usize },
    #[error("max_players ({0}) exceeds the 10-seat table limit")]
    MaxPlayersTooHigh(usize),
    #[error("min_buy_in ({min_buy_in}) must be >= 2x the big blind ({big_blind})")]
    BuyInBelowBlinds { min_buy_in: u32, big_blind: u32 },
    #[error("max_buy_in ({max}) must be >= min_buy_in ({min})")]
    MaxBuyInBelowMin { min: u32, max: u32 },
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blinds.small == 0 || self.blinds.big <= self.blinds.small {
            return Err(ConfigError::InvalidBlinds { small: self.blinds.small, big: self.blinds.big });
        }
        if self.min_players < 2 {
            return Err(ConfigError::MinPlayersTooLow(self.min_players));
        }
        if self.max_players < self.min_players {
            return Err(ConfigError::MaxBelowMin { min: self.min_players, max: self.max_players });
        }
        if self.max_players > 10 {
            return Err(ConfigError::MaxPlayersTooHigh(self.max_players));
        }
        if self.min_buy_in < self.blinds.big * 2 {
            return Err(ConfigError::BuyInBelowBlinds { min_buy_in: self.min_buy_in, big_blind: self.blinds.big });
        }
        if self.max_buy_in < self.min_buy_in {
            return Err(ConfigError::MaxBuyInBelowMin { min: self.min_buy_in, max: self.max_buy_in });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(TableConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_blinds() {
        let mut cfg = TableConfig::default();
        cfg.blinds = Blinds { small: 100, big: 100 };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidBlinds { small: 100, big: 100 }));
    }

    #[test]
    fn rejects_too_many_seats() {
        let mut cfg = TableConfig::default();
        cfg.max_players = 11;
        assert_eq!(cfg.validate(), Err(ConfigError::MaxPlayersTooHigh(11)));
    }

    #[test]
    fn rejects_buy_in_below_twice_the_big_blind() {
        let mut cfg = TableConfig::default();
        cfg.min_buy_in = cfg.blinds.big;
        assert!(matches!(cfg.validate(), Err(ConfigError::BuyInBelowBlinds { .. })));
    }
}
