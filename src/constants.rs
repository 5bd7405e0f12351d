/// Round identifiers of a 128-player draw, first round to the title.
pub const ROUNDS: [&str; 7] = ["r64", "r32", "r16", "qf", "sm", "f", "w"];

/// Points a round is worth before black points are subtracted
pub const ROUND_BASE_POINTS: i64 = 10;

/// Index of the first round that is played in the second week
pub const SECOND_WEEK_START: usize = 3;

/// Bonus for the tournament winner
pub const CHAMPION_BONUS: i64 = 50;

/// Points lost per round the designated loser survives
pub const LOSER_PENALTY_PER_ROUND: i64 = -10;

/// Default number of players in a selection
pub const DEFAULT_SELECTION_LIMIT: usize = 14;

/// Default black points budget
pub const DEFAULT_BLACK_POINTS_LIMIT: u32 = 20;

/// Players need to survive this many rounds to qualify for the joker
pub const JOKER_MIN_ROUNDS: u32 = 4;

/// Number of joker candidates that get reported
pub const JOKER_COUNT: usize = 5;

/// Seed tiers as `(highest seed in tier, black points)`, best tier first.
pub const BLACK_POINT_TIERS: [(u32, u32); 5] = [(2, 5), (4, 4), (8, 3), (16, 2), (32, 1)];

/// Default round sequence as owned strings
pub fn default_rounds() -> Vec<String> {
    ROUNDS.iter().map(|r| r.to_string()).collect()
}
