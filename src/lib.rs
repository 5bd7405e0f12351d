//! Sportpools Core - tennis pool roster optimiser.
//!
//! Emulates a single-elimination draw from per-round win probabilities,
//! turns the outcome into a potency score per player, and picks the
//! highest scoring selection within a player count and a black points
//! budget. Python bindings are available behind the `python` feature.

pub mod bracket;
pub mod competitor;
pub mod config;
pub mod constants;
pub mod error;
pub mod pool;
pub mod report;
pub mod roster;
pub mod scoring;
pub mod selection;

#[cfg(feature = "python")]
mod python;

pub use bracket::{match_winner, BracketEmulator, Side, Standing, Standings, TieBreak};
pub use competitor::{black_points_for_seed, Competitor};
pub use config::{ConfigError, PoolConfig};
pub use constants::{
    CHAMPION_BONUS, DEFAULT_BLACK_POINTS_LIMIT, DEFAULT_SELECTION_LIMIT, ROUNDS,
    ROUND_BASE_POINTS, SECOND_WEEK_START,
};
pub use error::{PoolError, Result};
pub use pool::{prepare_schedule, run_pool, select, PoolOutcome};
pub use report::SelectionReport;
pub use roster::{parse_probability, RosterRecord, RosterTable};
pub use scoring::{probabilities_to_score, rounds_to_score, ScoringStrategy};
pub use selection::{
    build_program, BinaryProgram, ConstraintRow, ForcedPick, IntegerProgramSolver, MicroLpSolver,
    Relation, SelectionOptimizer, SelectionOutcome, SelectionWarning,
};
