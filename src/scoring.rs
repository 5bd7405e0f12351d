use serde::{Deserialize, Serialize};
use tracing::info;

use crate::competitor::Competitor;
use crate::constants::{
    CHAMPION_BONUS, LOSER_PENALTY_PER_ROUND, ROUND_BASE_POINTS, SECOND_WEEK_START,
};

/// Points a player earns per round won, after paying for black points
fn round_value(black_points: u32) -> i64 {
    ROUND_BASE_POINTS - i64::from(black_points)
}

/// Score of a player who wins `rounds` rounds.
///
/// Every round is worth `10 - black_points`, rounds from the second week on
/// count double, and winning all `total_rounds` adds the champion bonus. The
/// designated loser instead costs 10 points per round won.
pub fn rounds_to_score(rounds: u32, black_points: u32, loser: bool, total_rounds: usize) -> i64 {
    let rounds_won = i64::from(rounds);

    if loser {
        return rounds_won * LOSER_PENALTY_PER_ROUND;
    }

    let value = round_value(black_points);
    let base_score = rounds_won * value;
    let second_week_score = (rounds_won - SECOND_WEEK_START as i64).max(0) * value;
    let win_score = if rounds as usize == total_rounds {
        CHAMPION_BONUS
    } else {
        0
    };

    base_score + second_week_score + win_score
}

/// Expected score from per-round probabilities.
///
/// First-week rounds weigh `10 - black_points`, second-week rounds up to the
/// final weigh double, and the last entry is the title chance times the
/// champion bonus. For the designated loser every round weighs the same.
pub fn probabilities_to_score(round_probs: &[f64], black_points: u32, loser: bool) -> f64 {
    let value = round_value(black_points) as f64;

    if loser {
        return round_probs.iter().map(|p| p * value).sum();
    }

    let Some((&win, earlier)) = round_probs.split_last() else {
        return 0.0;
    };

    let first_week_end = SECOND_WEEK_START.min(earlier.len());
    let (first_week, second_week) = earlier.split_at(first_week_end);

    let first_week_score: f64 = first_week.iter().map(|p| p * value).sum();
    let second_week_score: f64 = second_week.iter().map(|p| p * 2.0 * value).sum();
    let win_score = win * CHAMPION_BONUS as f64;

    first_week_score + second_week_score + win_score
}

/// Which data drives a player's potency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Rounds survived in a single emulated draw
    Simulated,

    /// Forecast probabilities
    #[default]
    Probabilistic,
}

impl ScoringStrategy {
    /// Potency of a single player.
    pub fn score(&self, competitor: &Competitor, total_rounds: usize, loser: bool) -> f64 {
        match self {
            ScoringStrategy::Simulated => rounds_to_score(
                competitor.rounds_survived,
                competitor.black_points,
                loser,
                total_rounds,
            ) as f64,
            ScoringStrategy::Probabilistic => {
                probabilities_to_score(&competitor.probabilities, competitor.black_points, loser)
            }
        }
    }

    /// Fill in the potency of every player.
    pub fn assign_potency(&self, competitors: &mut [Competitor], total_rounds: usize) {
        info!(strategy = ?self, "Determining score potency");

        for competitor in competitors.iter_mut() {
            competitor.potency = self.score(competitor, total_rounds, false);
        }
    }
}
