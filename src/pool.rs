use tracing::info;

use crate::bracket::{BracketEmulator, Standings};
use crate::competitor::Competitor;
use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use crate::report::SelectionReport;
use crate::roster::RosterTable;
use crate::selection::{IntegerProgramSolver, SelectionOptimizer, SelectionOutcome};

/// Everything a pool run produces.
#[derive(Clone, Debug)]
pub struct PoolOutcome {
    /// Every player with emulated rounds and potency filled in, in draw order
    pub schedule: Vec<Competitor>,
    pub standings: Standings,
    pub report: SelectionReport,
}

/// Emulate the draw and attach rounds survived and potency to every player.
pub fn prepare_schedule(
    roster: &RosterTable,
    config: &PoolConfig,
) -> Result<(Vec<Competitor>, Standings)> {
    if roster.rounds() != config.rounds.as_slice() {
        return Err(PoolError::InvalidInput(format!(
            "roster rounds {:?} differ from configured rounds {:?}",
            roster.rounds(),
            config.rounds
        )));
    }

    let emulator = BracketEmulator::new(config.rounds.clone(), config.tie_break);
    let draw = roster.competitors();
    let standings = emulator.play_draw(draw)?;

    info!("Updating original schedule");
    let mut schedule = draw.to_vec();
    standings.merge_into(draw, &mut schedule)?;

    config.scoring.assign_potency(&mut schedule, config.rounds.len());

    Ok((schedule, standings))
}

/// Optimise a prepared schedule with the configured limits and forced pick.
pub fn select(
    schedule: &[Competitor],
    config: &PoolConfig,
    solver: &dyn IntegerProgramSolver,
) -> Result<SelectionOutcome> {
    let optimizer = SelectionOptimizer::new(solver, config.scoring, config.rounds.len());
    optimizer.optimise(
        schedule,
        config.selection_limit,
        config.black_points_limit,
        config.forced_pick.as_deref(),
    )
}

/// Run the whole pool: emulate, score, optimise and report.
pub fn run_pool(
    roster: &RosterTable,
    config: &PoolConfig,
    solver: &dyn IntegerProgramSolver,
) -> Result<PoolOutcome> {
    config.validate()?;

    let (schedule, standings) = prepare_schedule(roster, config)?;
    let outcome = select(&schedule, config, solver)?;
    let report = SelectionReport::new(outcome, config.joker_min_rounds, config.joker_count);

    Ok(PoolOutcome {
        schedule,
        standings,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringStrategy;
    use crate::selection::MicroLpSolver;

    fn rounds() -> Vec<String> {
        vec!["r1".to_string(), "r2".to_string(), "f".to_string()]
    }

    // Eight players, three rounds.
    fn make_roster() -> RosterTable {
        let players = vec![
            Competitor::new("Alpha", 1, vec![0.95, 0.80, 0.55]),
            Competitor::new("Bravo", 0, vec![0.05, 0.01, 0.00]),
            Competitor::new("Charlie", 5, vec![0.60, 0.15, 0.05]),
            Competitor::new("Delta", 0, vec![0.40, 0.04, 0.01]),
            Competitor::new("Echo", 3, vec![0.85, 0.55, 0.25]),
            Competitor::new("Foxtrot", 0, vec![0.15, 0.05, 0.01]),
            Competitor::new("Golf", 0, vec![0.45, 0.10, 0.03]),
            Competitor::new("Hotel", 2, vec![0.55, 0.30, 0.10]),
        ];
        RosterTable::new(rounds(), players).unwrap()
    }

    #[test]
    fn test_prepare_schedule() {
        let config = PoolConfig::new().with_rounds(rounds());
        let (schedule, standings) = prepare_schedule(&make_roster(), &config).unwrap();

        assert_eq!(standings.champion(), Some(0));
        let survived: Vec<u32> = schedule.iter().map(|c| c.rounds_survived).collect();
        assert_eq!(survived, vec![3, 0, 1, 0, 2, 0, 0, 1]);
        assert!(schedule.iter().all(|c| c.potency >= 0.0));
        assert!(schedule[0].potency > schedule[1].potency);
    }

    #[test]
    fn test_run_pool() {
        let config = PoolConfig::new()
            .with_rounds(rounds())
            .with_selection_limit(3)
            .with_black_points_limit(9)
            .with_scoring(ScoringStrategy::Simulated);

        let outcome = run_pool(&make_roster(), &config, &MicroLpSolver).unwrap();
        let report = &outcome.report;

        assert_eq!(report.players.len(), 3);
        assert!(report.total_black_points <= 9);
        // Alpha (5 bp) wins the draw: 3 * 5 + 50 = 65
        assert_eq!(report.players[0].name, "Alpha");
        assert_eq!(report.players[0].potency, 65.0);
        assert!(report.joker_order.is_empty());
    }

    #[test]
    fn test_run_pool_with_forced_pick() {
        let config = PoolConfig::new()
            .with_rounds(rounds())
            .with_selection_limit(2)
            .with_black_points_limit(5)
            .with_scoring(ScoringStrategy::Simulated)
            .with_forced_pick("echo");

        let outcome = run_pool(&make_roster(), &config, &MicroLpSolver).unwrap();
        let report = &outcome.report;

        assert_eq!(report.players.len(), 3);
        let forced = report.forced.as_ref().unwrap();
        assert_eq!(forced.name, "Echo");
        // Echo wins two rounds: -20 as the loser
        assert_eq!(forced.potency, -20.0);
        assert!(report.players.iter().any(|c| c.name == "Echo"));
        assert!(report.total_black_points <= 9);
    }

    #[test]
    fn test_round_mismatch() {
        let config = PoolConfig::new();
        assert!(matches!(
            run_pool(&make_roster(), &config, &MicroLpSolver),
            Err(PoolError::InvalidInput(_))
        ));
    }
}
