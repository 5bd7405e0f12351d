//! Python bindings, enabled with the `python` feature.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::competitor::{black_points_for_seed, Competitor};
use crate::config::PoolConfig;
use crate::constants::default_rounds;
use crate::error::PoolError;
use crate::pool::{prepare_schedule, run_pool};
use crate::roster::RosterTable;
use crate::scoring::{probabilities_to_score, rounds_to_score, ScoringStrategy};
use crate::selection::MicroLpSolver;

impl From<PoolError> for PyErr {
    fn from(err: PoolError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn build_roster(
    names: Vec<String>,
    seeds: Vec<u32>,
    probabilities: Vec<Vec<f64>>,
    rounds: Vec<String>,
) -> PyResult<RosterTable> {
    if names.len() != seeds.len() || names.len() != probabilities.len() {
        return Err(PyValueError::new_err(
            "names, seeds and probabilities must have the same length",
        ));
    }

    let competitors = names
        .into_iter()
        .zip(seeds)
        .zip(probabilities)
        .map(|((name, seed), probs)| Competitor::new(name, seed, probs))
        .collect();

    Ok(RosterTable::new(rounds, competitors)?)
}

fn parse_scoring(scoring: &str) -> PyResult<ScoringStrategy> {
    match scoring {
        "probabilistic" => Ok(ScoringStrategy::Probabilistic),
        "simulated" => Ok(ScoringStrategy::Simulated),
        other => Err(PyValueError::new_err(format!(
            "unknown scoring strategy '{}'",
            other
        ))),
    }
}

/// Black points for a seed.
#[pyfunction]
fn cost_tier(seed: u32) -> u32 {
    black_points_for_seed(seed)
}

/// Score of a player who wins `rounds` rounds.
#[pyfunction]
#[pyo3(name = "rounds_to_score")]
#[pyo3(signature = (rounds, black_points, loser = false, total_rounds = 7))]
fn py_rounds_to_score(rounds: u32, black_points: u32, loser: bool, total_rounds: usize) -> i64 {
    rounds_to_score(rounds, black_points, loser, total_rounds)
}

/// Expected score from per-round probabilities.
#[pyfunction]
#[pyo3(name = "probabilities_to_score")]
#[pyo3(signature = (round_probs, black_points, loser = false))]
fn py_probabilities_to_score(round_probs: Vec<f64>, black_points: u32, loser: bool) -> f64 {
    probabilities_to_score(&round_probs, black_points, loser)
}

/// Emulate the draw; returns rounds survived per player.
#[pyfunction]
#[pyo3(signature = (names, seeds, probabilities, rounds = None))]
fn simulate_draw(
    names: Vec<String>,
    seeds: Vec<u32>,
    probabilities: Vec<Vec<f64>>,
    rounds: Option<Vec<String>>,
) -> PyResult<HashMap<String, u32>> {
    let rounds = rounds.unwrap_or_else(default_rounds);
    let roster = build_roster(names, seeds, probabilities, rounds.clone())?;
    let config = PoolConfig::new().with_rounds(rounds);
    let (schedule, _) = prepare_schedule(&roster, &config)?;

    Ok(schedule
        .into_iter()
        .map(|c| (c.name, c.rounds_survived))
        .collect())
}

/// Optimise the selection.
///
/// Returns `(names by potency, total potency, total black points,
/// points sacrificed by the loser or None, warnings)`.
#[pyfunction]
#[pyo3(signature = (
    names,
    seeds,
    probabilities,
    selection_limit = 14,
    black_points_limit = 20,
    loser = None,
    rounds = None,
    scoring = "probabilistic"
))]
#[allow(clippy::too_many_arguments)]
fn optimise_selection(
    names: Vec<String>,
    seeds: Vec<u32>,
    probabilities: Vec<Vec<f64>>,
    selection_limit: usize,
    black_points_limit: u32,
    loser: Option<String>,
    rounds: Option<Vec<String>>,
    scoring: &str,
) -> PyResult<(Vec<String>, f64, u32, Option<f64>, Vec<String>)> {
    let rounds = rounds.unwrap_or_else(default_rounds);
    let roster = build_roster(names, seeds, probabilities, rounds.clone())?;

    let mut config = PoolConfig::new()
        .with_rounds(rounds)
        .with_selection_limit(selection_limit)
        .with_black_points_limit(black_points_limit)
        .with_scoring(parse_scoring(scoring)?);
    config.forced_pick = loser;

    let outcome = run_pool(&roster, &config, &MicroLpSolver)?;
    let report = outcome.report;
    let sacrificed = report.sacrificed();
    let warnings = report.warning_messages();

    Ok((
        report.players.into_iter().map(|c| c.name).collect(),
        report.total_potency,
        report.total_black_points,
        sacrificed,
        warnings,
    ))
}

/// Python module definition
#[pymodule]
fn sportpools_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(cost_tier, m)?)?;
    m.add_function(wrap_pyfunction!(py_rounds_to_score, m)?)?;
    m.add_function(wrap_pyfunction!(py_probabilities_to_score, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_draw, m)?)?;
    m.add_function(wrap_pyfunction!(optimise_selection, m)?)?;

    m.add("ROUNDS", default_rounds())?;

    Ok(())
}
