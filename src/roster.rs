use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::competitor::Competitor;
use crate::error::{PoolError, Result};

/// Convert a probability field into a value in [0, 1].
///
/// Accepts percentages (`"5%"`, `"2.5%"`, `"100.0%"`) and plain fractions
/// (`"0.05"`). Anything else is an error, never a silent zero.
pub fn parse_probability(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| PoolError::InvalidProbability {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let (number, scale) = match trimmed.strip_suffix('%') {
        Some(number) => (number.trim(), 100.0),
        None => (trimmed, 1.0),
    };

    let value: f64 = number
        .parse()
        .map_err(|e: std::num::ParseFloatError| invalid(&e.to_string()))?;

    check_probability(value / scale).map_err(|_| invalid("outside [0, 1]"))
}

fn check_probability(value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(PoolError::InvalidProbability {
            value: value.to_string(),
            reason: "outside [0, 1]".to_string(),
        })
    }
}

/// One cleaned row of the forecast table.
#[derive(Clone, Debug)]
pub struct RosterRecord {
    pub name: String,
    pub seed: u32,
    /// Raw probability fields, one per round
    pub probabilities: Vec<String>,
}

/// The draw in bracket order together with its round sequence.
///
/// Construction validates everything the emulator relies on: a power-of-two
/// draw with enough players for every round, one probability per round and
/// unique names.
#[derive(Clone, Debug)]
pub struct RosterTable {
    rounds: Vec<String>,
    competitors: Vec<Competitor>,
}

impl RosterTable {
    pub fn new(rounds: Vec<String>, competitors: Vec<Competitor>) -> Result<Self> {
        validate(&rounds, &competitors)?;
        Ok(RosterTable {
            rounds,
            competitors,
        })
    }

    /// Build a table from rows whose probabilities are still strings.
    pub fn from_records(rounds: Vec<String>, records: Vec<RosterRecord>) -> Result<Self> {
        let competitors = records
            .into_iter()
            .map(|record| {
                let probabilities = record
                    .probabilities
                    .iter()
                    .map(|p| parse_probability(p))
                    .collect::<Result<Vec<f64>>>()?;
                Ok(Competitor::new(record.name, record.seed, probabilities))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(rounds, competitors)
    }

    /// Parse CSV text with lines of the form `name,seed,p_0,...,p_{R-1}`.
    ///
    /// Blank lines are skipped, as is a leading header line starting with `name`.
    pub fn from_csv_str(rounds: Vec<String>, text: &str) -> Result<Self> {
        let expected_columns = rounds.len() + 2;
        let mut records = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if records.is_empty() && line.to_lowercase().starts_with("name,") {
                continue;
            }

            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() != expected_columns {
                return Err(PoolError::InvalidRoster(format!(
                    "line {}: expected {} columns, found {}",
                    line_no + 1,
                    expected_columns,
                    parts.len()
                )));
            }

            let seed = if parts[1].is_empty() {
                0
            } else {
                parts[1].parse().map_err(|e| {
                    PoolError::InvalidRoster(format!(
                        "line {}: invalid seed '{}': {}",
                        line_no + 1,
                        parts[1],
                        e
                    ))
                })?
            };

            records.push(RosterRecord {
                name: parts[0].to_string(),
                seed,
                probabilities: parts[2..].iter().map(|p| p.to_string()).collect(),
            });
        }

        Self::from_records(rounds, records)
    }

    /// Read a CSV roster from disk.
    pub fn read_from_file(rounds: Vec<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading roster from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_csv_str(rounds, &text)
    }

    pub fn rounds(&self) -> &[String] {
        &self.rounds
    }

    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }
}

fn validate(rounds: &[String], competitors: &[Competitor]) -> Result<()> {
    if rounds.is_empty() {
        return Err(PoolError::InvalidRoster("no rounds given".to_string()));
    }

    let size = competitors.len();
    if size < 2 || !size.is_power_of_two() {
        return Err(PoolError::InvalidRoster(format!(
            "draw size {} is not a power of two",
            size
        )));
    }

    // A draw of 2^k players supports at most k rounds.
    let max_rounds = size.trailing_zeros() as usize;
    if rounds.len() > max_rounds {
        return Err(PoolError::InvalidRoster(format!(
            "{} rounds requested but a draw of {} only has {}",
            rounds.len(),
            size,
            max_rounds
        )));
    }

    let mut names = HashSet::new();
    for competitor in competitors {
        if !names.insert(competitor.name.to_lowercase()) {
            return Err(PoolError::InvalidRoster(format!(
                "duplicate player '{}'",
                competitor.name
            )));
        }

        if competitor.probabilities.len() != rounds.len() {
            return Err(PoolError::InvalidRoster(format!(
                "{} has {} probabilities for {} rounds",
                competitor.name,
                competitor.probabilities.len(),
                rounds.len()
            )));
        }

        for &p in &competitor.probabilities {
            check_probability(p)?;
        }
    }

    Ok(())
}
