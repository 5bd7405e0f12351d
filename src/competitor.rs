use std::fmt;

use crate::constants::BLACK_POINT_TIERS;

/// Translate a seed into black points.
///
/// Seeds 1-2 cost 5, 3-4 cost 4, 5-8 cost 3, 9-16 cost 2 and 17-32 cost 1.
/// Unseeded players (seed 0) and anything past 32 are free.
pub fn black_points_for_seed(seed: u32) -> u32 {
    if seed == 0 {
        return 0;
    }

    BLACK_POINT_TIERS
        .iter()
        .find(|&&(last_seed, _)| seed <= last_seed)
        .map(|&(_, points)| points)
        .unwrap_or(0)
}

/// A single player in the draw.
///
/// `probabilities[r]` is the forecast chance of winning round `r`. The
/// simulation fields start out cleared and are filled in once the draw has
/// been emulated.
#[derive(Clone, Debug, PartialEq)]
pub struct Competitor {
    pub name: String,

    /// Seed number, 0 when unseeded
    pub seed: u32,

    /// Cost of picking this player
    pub black_points: u32,

    /// Per-round win probabilities, one per round in the draw
    pub probabilities: Vec<f64>,

    /// Knocked out in the emulated draw
    pub terminated: bool,

    /// Rounds won in the emulated draw
    pub rounds_survived: u32,

    /// Fantasy score value
    pub potency: f64,
}

impl Competitor {
    /// Create a competitor; black points are derived from the seed.
    pub fn new(name: impl Into<String>, seed: u32, probabilities: Vec<f64>) -> Self {
        Competitor {
            name: name.into(),
            seed,
            black_points: black_points_for_seed(seed),
            probabilities,
            terminated: false,
            rounds_survived: 0,
            potency: 0.0,
        }
    }

    /// Odds for a round, `None` when the round is past the end of the vector
    pub fn round_odds(&self, round_index: usize) -> Option<f64> {
        self.probabilities.get(round_index).copied()
    }

    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

impl fmt::Display for Competitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (seed {}) | {} bp | {} rounds | {:.2}",
            self.name, self.seed, self.black_points, self.rounds_survived, self.potency
        )
    }
}
