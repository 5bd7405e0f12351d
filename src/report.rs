use std::fmt;

use crate::competitor::Competitor;
use crate::selection::{ForcedPick, SelectionOutcome, SelectionWarning};

/// User-facing view of an optimal selection.
#[derive(Clone, Debug)]
pub struct SelectionReport {
    /// Selected players, highest potency first
    pub players: Vec<Competitor>,
    pub total_potency: f64,
    pub total_black_points: u32,
    /// Order in which to play the joker
    pub joker_order: Vec<Competitor>,
    pub forced: Option<ForcedPick>,
    pub warnings: Vec<SelectionWarning>,
}

impl SelectionReport {
    /// Build the report.
    ///
    /// Joker candidates are selected players who survived at least
    /// `joker_min_rounds` rounds in the emulated draw, cheapest first, capped
    /// at `joker_count`.
    pub fn new(outcome: SelectionOutcome, joker_min_rounds: u32, joker_count: usize) -> Self {
        let total_potency = outcome.total_potency();
        let total_black_points = outcome.total_black_points();

        let mut players = outcome.selection;
        players.sort_by(|a, b| b.potency.total_cmp(&a.potency));

        let mut joker_order: Vec<Competitor> = players
            .iter()
            .filter(|c| c.rounds_survived >= joker_min_rounds)
            .cloned()
            .collect();
        joker_order.sort_by_key(|c| c.black_points);
        joker_order.truncate(joker_count);

        SelectionReport {
            players,
            total_potency,
            total_black_points,
            joker_order,
            forced: outcome.forced,
            warnings: outcome.warnings,
        }
    }

    /// Points given up by the forced pick, if one was made
    pub fn sacrificed(&self) -> Option<f64> {
        self.forced.as_ref().map(ForcedPick::sacrificed)
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for SelectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimal set of players is as follows:")?;
        for player in &self.players {
            writeln!(f, "  {}", player)?;
        }
        writeln!(
            f,
            "The selection of these players results in {:.0} points with {} black points",
            self.total_potency, self.total_black_points
        )?;

        if let Some(forced) = &self.forced {
            writeln!(
                f,
                "Picking {} as the loser costs {:.0} points",
                forced.name,
                forced.sacrificed()
            )?;
        }
        for warning in &self.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }

        writeln!(f, "Select your joker in this order:")?;
        for player in &self.joker_order {
            writeln!(f, "  {}", player)?;
        }
        Ok(())
    }
}
