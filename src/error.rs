//! Error types for the pool pipeline

use thiserror::Error;

use crate::config::ConfigError;

/// Fatal errors. Any of these aborts the run for the roster at hand.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A probability field could not be read as a value in [0, 1]
    #[error("Invalid probability '{value}': {reason}")]
    InvalidProbability { value: String, reason: String },

    /// The roster violates a load-time invariant
    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    /// An odd number of players entered a round
    #[error("Malformed bracket: {active} active players entering round {round}")]
    MalformedBracket { round: String, active: usize },

    /// Two players met with identical odds under the rejecting tie-break
    #[error("Tied match in round {round}: {first} and {second} have equal odds")]
    TiedMatch {
        round: String,
        first: String,
        second: String,
    },

    /// Arguments that can never produce a selection
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No selection satisfies both the count and the budget
    #[error(
        "No selection of {selection_limit} players fits within {black_points_limit} black points"
    )]
    Infeasible {
        selection_limit: usize,
        black_points_limit: u32,
    },

    /// The solver proved its program has no feasible assignment. Carries no
    /// limits: the solver only sees constraint rows.
    #[error("Solver found no feasible assignment")]
    SolverInfeasible,

    /// The solver gave up for a reason other than infeasibility
    #[error("Solver error: {0}")]
    Solver(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;
