//! Pool configuration.
//!
//! Every field has a default, so a TOML file only needs the values that
//! differ:
//!
//! ```
//! use sportpools_core::PoolConfig;
//!
//! let config = PoolConfig::from_toml_str(r#"
//!     black_points_limit = 18
//!     forced_pick = "Rafael Nadal"
//! "#).unwrap();
//!
//! assert_eq!(config.black_points_limit, 18);
//! assert_eq!(config.selection_limit, 14);
//! assert_eq!(config.rounds.len(), 7);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bracket::TieBreak;
use crate::constants::{
    default_rounds, DEFAULT_BLACK_POINTS_LIMIT, DEFAULT_SELECTION_LIMIT, JOKER_COUNT,
    JOKER_MIN_ROUNDS,
};
use crate::scoring::ScoringStrategy;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one pool run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PoolConfig {
    /// Round identifiers, first round to the final
    pub rounds: Vec<String>,

    /// Number of players to select
    pub selection_limit: usize,

    /// Black points available
    pub black_points_limit: u32,

    /// Designated loser that must be part of the selection
    pub forced_pick: Option<String>,

    /// Data that drives potency
    pub scoring: ScoringStrategy,

    /// Resolution of matches between players with equal odds
    pub tie_break: TieBreak,

    /// Rounds a selected player must survive to qualify for the joker
    pub joker_min_rounds: u32,

    /// Joker candidates to report
    pub joker_count: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            rounds: default_rounds(),
            selection_limit: DEFAULT_SELECTION_LIMIT,
            black_points_limit: DEFAULT_BLACK_POINTS_LIMIT,
            forced_pick: None,
            scoring: ScoringStrategy::default(),
            tie_break: TieBreak::default(),
            joker_min_rounds: JOKER_MIN_ROUNDS,
            joker_count: JOKER_COUNT,
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds.is_empty() {
            return Err(ConfigError::Invalid("rounds must not be empty".to_string()));
        }
        if self.selection_limit == 0 {
            return Err(ConfigError::Invalid(
                "selection_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_selection_limit(mut self, limit: usize) -> Self {
        self.selection_limit = limit;
        self
    }

    pub fn with_black_points_limit(mut self, limit: u32) -> Self {
        self.black_points_limit = limit;
        self
    }

    pub fn with_forced_pick(mut self, name: impl Into<String>) -> Self {
        self.forced_pick = Some(name.into());
        self
    }

    pub fn with_rounds(mut self, rounds: Vec<String>) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringStrategy) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}
