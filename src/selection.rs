use std::fmt;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};
use tracing::{info, warn};

use crate::competitor::Competitor;
use crate::error::{PoolError, Result};
use crate::scoring::ScoringStrategy;

/// Relation between a constraint row and its right-hand side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Equal,
    LessOrEqual,
}

/// `Σ coefficients[i]·x[i] (relation) rhs`
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintRow {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

/// A 0/1 integer program: maximise `objective·x` subject to the rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BinaryProgram {
    pub objective: Vec<f64>,
    pub constraints: Vec<ConstraintRow>,
}

impl BinaryProgram {
    pub fn new(objective: Vec<f64>) -> Self {
        BinaryProgram {
            objective,
            constraints: Vec::new(),
        }
    }

    /// Number of decision variables
    pub fn len(&self) -> usize {
        self.objective.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objective.is_empty()
    }

    pub fn with_row(mut self, coefficients: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        self.constraints.push(ConstraintRow {
            coefficients,
            relation,
            rhs,
        });
        self
    }

    /// Pin a single variable to 1
    pub fn with_pinned(self, index: usize) -> Self {
        let mut coefficients = vec![0.0; self.len()];
        coefficients[index] = 1.0;
        self.with_row(coefficients, Relation::Equal, 1.0)
    }

    /// Objective value of an assignment
    pub fn value(&self, assignment: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(assignment)
            .filter(|(_, &x)| x)
            .map(|(c, _)| c)
            .sum()
    }

    /// Whether an assignment satisfies every row
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        const TOLERANCE: f64 = 1e-6;

        self.constraints.iter().all(|row| {
            let lhs: f64 = row
                .coefficients
                .iter()
                .zip(assignment)
                .filter(|(_, &x)| x)
                .map(|(c, _)| c)
                .sum();
            match row.relation {
                Relation::Equal => (lhs - row.rhs).abs() <= TOLERANCE,
                Relation::LessOrEqual => lhs <= row.rhs + TOLERANCE,
            }
        })
    }
}

/// A mixed-integer solver. Solving is a blocking call.
pub trait IntegerProgramSolver {
    /// Return the optimal assignment, one flag per variable.
    ///
    /// Must fail with [`PoolError::SolverInfeasible`] when no assignment
    /// satisfies the constraints and [`PoolError::Solver`] for anything else.
    /// [`SelectionOptimizer::optimise`] turns the former into
    /// [`PoolError::Infeasible`] with the limits it enforced.
    fn solve(&self, program: &BinaryProgram) -> Result<Vec<bool>>;
}

/// Solver backed by `good_lp` and its pure Rust `microlp` backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct MicroLpSolver;

fn weighted_sum(variables: &[Variable], coefficients: &[f64]) -> Expression {
    variables
        .iter()
        .zip(coefficients)
        .map(|(&x, &c)| c * x)
        .sum()
}

impl IntegerProgramSolver for MicroLpSolver {
    fn solve(&self, program: &BinaryProgram) -> Result<Vec<bool>> {
        let mut vars = ProblemVariables::new();
        let xs: Vec<Variable> = (0..program.len())
            .map(|_| vars.add(variable().binary()))
            .collect();

        let objective = weighted_sum(&xs, &program.objective);
        let mut model = vars.maximise(objective).using(default_solver);

        for row in &program.constraints {
            let lhs = weighted_sum(&xs, &row.coefficients);
            model = model.with(match row.relation {
                Relation::Equal => constraint::eq(lhs, row.rhs),
                Relation::LessOrEqual => constraint::leq(lhs, row.rhs),
            });
        }

        let solution = model.solve().map_err(|e| match e {
            ResolutionError::Infeasible => PoolError::SolverInfeasible,
            other => PoolError::Solver(other.to_string()),
        })?;

        Ok(xs.iter().map(|&x| solution.value(x) > 0.5).collect())
    }
}

/// The designated loser that was forced into the selection.
#[derive(Clone, Debug, PartialEq)]
pub struct ForcedPick {
    pub name: String,
    pub black_points: u32,
    /// Potency under the loser scoring, as used in the selection
    pub potency: f64,
    /// Potency the player would have had as a regular pick
    pub regular_potency: f64,
}

impl ForcedPick {
    /// Points given up by picking this player as the loser
    pub fn sacrificed(&self) -> f64 {
        self.regular_potency - self.potency
    }
}

/// Recoverable issues found while optimising.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionWarning {
    ForcedPickNotFound(String),
}

impl fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionWarning::ForcedPickNotFound(name) => {
                write!(f, "loser {} is not in the draw", name)
            }
        }
    }
}

/// Result of an optimisation run.
#[derive(Clone, Debug)]
pub struct SelectionOutcome {
    /// Selected players, in table order
    pub selection: Vec<Competitor>,
    /// Count actually enforced
    pub selection_limit: usize,
    /// Budget actually enforced
    pub black_points_limit: u32,
    pub forced: Option<ForcedPick>,
    pub warnings: Vec<SelectionWarning>,
}

impl SelectionOutcome {
    pub fn total_potency(&self) -> f64 {
        self.selection.iter().map(|c| c.potency).sum()
    }

    pub fn total_black_points(&self) -> u32 {
        self.selection.iter().map(|c| c.black_points).sum()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.selection.iter().any(|c| c.is_named(name))
    }
}

/// Picks the potency-maximising players under a count and a budget.
pub struct SelectionOptimizer<'a> {
    solver: &'a dyn IntegerProgramSolver,
    scoring: ScoringStrategy,
    total_rounds: usize,
}

impl<'a> SelectionOptimizer<'a> {
    /// `scoring` and `total_rounds` are only used to rescore a forced pick.
    pub fn new(
        solver: &'a dyn IntegerProgramSolver,
        scoring: ScoringStrategy,
        total_rounds: usize,
    ) -> Self {
        SelectionOptimizer {
            solver,
            scoring,
            total_rounds,
        }
    }

    /// Optimise the player selection.
    ///
    /// With a `forced_name` that matches a player, that player is rescored
    /// as the loser and pinned into the selection; count and budget grow by
    /// one player and that player's black points. An unknown name only
    /// produces a warning.
    pub fn optimise(
        &self,
        competitors: &[Competitor],
        selection_limit: usize,
        black_points_limit: u32,
        forced_name: Option<&str>,
    ) -> Result<SelectionOutcome> {
        info!(
            players = competitors.len(),
            selection_limit, black_points_limit, "Optimising selection"
        );

        if selection_limit == 0 {
            return Err(PoolError::InvalidInput(
                "selection limit must be positive".to_string(),
            ));
        }

        let mut candidates = competitors.to_vec();
        let mut warnings = Vec::new();
        let mut forced = None;
        let mut pinned = None;
        let mut effective_limit = selection_limit;
        let mut effective_budget = black_points_limit;

        if let Some(name) = forced_name {
            match candidates.iter().position(|c| c.is_named(name)) {
                Some(index) => {
                    let player = &mut candidates[index];
                    let regular_potency = player.potency;
                    player.potency = self.scoring.score(player, self.total_rounds, true);

                    info!(
                        "Forcing {} into the selection with potency {:.2}",
                        player.name, player.potency
                    );

                    effective_limit += 1;
                    effective_budget = black_points_limit
                        .checked_add(player.black_points)
                        .ok_or_else(|| {
                            PoolError::InvalidInput(format!(
                                "black points limit {} plus {} for forced pick {} overflows",
                                black_points_limit, player.black_points, player.name
                            ))
                        })?;
                    pinned = Some(index);
                    forced = Some(ForcedPick {
                        name: player.name.clone(),
                        black_points: player.black_points,
                        potency: player.potency,
                        regular_potency,
                    });
                }
                None => {
                    warn!("Forced pick {} not found, optimising without it", name);
                    warnings.push(SelectionWarning::ForcedPickNotFound(name.to_string()));
                }
            }
        }

        let infeasible = PoolError::Infeasible {
            selection_limit: effective_limit,
            black_points_limit: effective_budget,
        };

        if !is_feasible(&candidates, effective_limit, effective_budget, pinned) {
            return Err(infeasible);
        }

        let program = build_program(&candidates, effective_limit, effective_budget, pinned);
        let assignment = match self.solver.solve(&program) {
            Ok(assignment) => assignment,
            Err(PoolError::SolverInfeasible | PoolError::Infeasible { .. }) => {
                return Err(infeasible)
            }
            Err(e) => return Err(e),
        };

        if assignment.len() != candidates.len() || !program.is_satisfied_by(&assignment) {
            return Err(PoolError::Solver(
                "solver returned an assignment that violates the constraints".to_string(),
            ));
        }

        let selection: Vec<Competitor> = candidates
            .into_iter()
            .zip(&assignment)
            .filter(|(_, &x)| x)
            .map(|(c, _)| c)
            .collect();

        let outcome = SelectionOutcome {
            selection,
            selection_limit: effective_limit,
            black_points_limit: effective_budget,
            forced,
            warnings,
        };

        info!(
            potency = outcome.total_potency(),
            black_points = outcome.total_black_points(),
            "Optimiser finished"
        );

        Ok(outcome)
    }
}

/// Formulate the selection as a binary program.
///
/// maximise Σ potency·x subject to Σ x = `selection_limit`,
/// Σ black_points·x ≤ `black_points_limit` and optionally x[pinned] = 1.
pub fn build_program(
    competitors: &[Competitor],
    selection_limit: usize,
    black_points_limit: u32,
    pinned: Option<usize>,
) -> BinaryProgram {
    let program = BinaryProgram::new(competitors.iter().map(|c| c.potency).collect())
        .with_row(
            vec![1.0; competitors.len()],
            Relation::Equal,
            selection_limit as f64,
        )
        .with_row(
            competitors.iter().map(|c| f64::from(c.black_points)).collect(),
            Relation::LessOrEqual,
            f64::from(black_points_limit),
        );

    match pinned {
        Some(index) => program.with_pinned(index),
        None => program,
    }
}

/// A selection exists iff the pinned player plus the cheapest others fit.
fn is_feasible(
    competitors: &[Competitor],
    selection_limit: usize,
    black_points_limit: u32,
    pinned: Option<usize>,
) -> bool {
    if selection_limit > competitors.len() {
        return false;
    }

    let mut costs: Vec<u64> = competitors
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != pinned)
        .map(|(_, c)| u64::from(c.black_points))
        .collect();
    costs.sort_unstable();

    let pinned_cost = pinned.map_or(0, |i| u64::from(competitors[i].black_points));
    let others = selection_limit - usize::from(pinned.is_some());
    let cheapest = pinned_cost + costs.iter().take(others).sum::<u64>();

    cheapest <= u64::from(black_points_limit)
}
