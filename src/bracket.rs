use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::competitor::Competitor;
use crate::error::{PoolError, Result};

/// How a match between two players with identical odds is decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Seeded beats unseeded and the lower seed wins. Equal seeds go to the
    /// player drawn first.
    #[default]
    LowerSeed,

    /// Equal odds are treated as invalid input.
    Reject,
}

/// Which side of a match advanced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// Per-slot simulation state.
#[derive(Clone, Debug, PartialEq)]
pub struct Standing {
    /// Position in the draw
    pub slot: usize,
    pub seed: u32,
    /// Odds for the round currently being played
    pub round_odds: f64,
    pub terminated: bool,
    pub rounds_survived: u32,
}

/// Decide a match on the odds for the current round.
///
/// The strictly greater odds win. Ties go through `tie_break`; `None` means
/// the tie could not be resolved.
pub fn match_winner(first: &Standing, second: &Standing, tie_break: TieBreak) -> Option<Side> {
    if first.round_odds > second.round_odds {
        return Some(Side::First);
    }
    if second.round_odds > first.round_odds {
        return Some(Side::Second);
    }

    match tie_break {
        TieBreak::Reject => None,
        TieBreak::LowerSeed => {
            if seed_rank(second.seed) < seed_rank(first.seed) {
                Some(Side::Second)
            } else {
                Some(Side::First)
            }
        }
    }
}

fn seed_rank(seed: u32) -> u32 {
    if seed == 0 {
        u32::MAX
    } else {
        seed
    }
}

/// State of one emulated draw, indexed by bracket slot.
///
/// Created fresh for every run; nothing is shared between runs.
#[derive(Clone, Debug)]
pub struct Standings {
    entries: Vec<Standing>,
    rounds_played: usize,
}

impl Standings {
    pub fn new(competitors: &[Competitor]) -> Self {
        let entries = competitors
            .iter()
            .enumerate()
            .map(|(slot, c)| Standing {
                slot,
                seed: c.seed,
                round_odds: 0.0,
                terminated: false,
                rounds_survived: 0,
            })
            .collect();

        Standings {
            entries,
            rounds_played: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rounds_played(&self) -> usize {
        self.rounds_played
    }

    /// Slots still in the draw, in bracket order
    pub fn active_slots(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|s| !s.terminated)
            .map(|s| s.slot)
            .collect()
    }

    /// Rounds survived per slot
    pub fn rounds_survived(&self) -> Vec<u32> {
        self.entries.iter().map(|s| s.rounds_survived).collect()
    }

    /// The only player left, once the draw has been decided
    pub fn champion(&self) -> Option<usize> {
        match self.active_slots().as_slice() {
            [slot] => Some(*slot),
            _ => None,
        }
    }

    /// Copy the outcome onto `table`, matching players by name.
    ///
    /// `draw` must be the sequence these standings were built from. Every
    /// player in the draw has to exist in the table.
    pub fn merge_into(&self, draw: &[Competitor], table: &mut [Competitor]) -> Result<()> {
        let positions: HashMap<&str, usize> = table
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.as_str(), i))
            .collect();

        let mut updates = Vec::with_capacity(self.entries.len());
        for (standing, competitor) in self.entries.iter().zip(draw) {
            let index = positions.get(competitor.name.as_str()).ok_or_else(|| {
                PoolError::InvalidInput(format!("{} is not in the table", competitor.name))
            })?;
            updates.push((*index, standing.terminated, standing.rounds_survived));
        }

        for (index, terminated, rounds_survived) in updates {
            table[index].terminated = terminated;
            table[index].rounds_survived = rounds_survived;
        }

        Ok(())
    }
}

/// Deterministic single-elimination emulator.
///
/// Consecutive active players meet; the one with the better odds for the
/// round advances. Survivors keep their relative order so the next round's
/// pairs follow the bracket tree.
#[derive(Clone, Debug)]
pub struct BracketEmulator {
    rounds: Vec<String>,
    tie_break: TieBreak,
}

impl BracketEmulator {
    pub fn new(rounds: Vec<String>, tie_break: TieBreak) -> Self {
        BracketEmulator { rounds, tie_break }
    }

    pub fn rounds(&self) -> &[String] {
        &self.rounds
    }

    /// Emulate the entire draw.
    pub fn play_draw(&self, competitors: &[Competitor]) -> Result<Standings> {
        info!(
            players = competitors.len(),
            rounds = self.rounds.len(),
            "Emulating the entire draw"
        );

        let mut standings = Standings::new(competitors);
        for round_index in 0..self.rounds.len() {
            self.play_round(competitors, &mut standings, round_index)?;
        }

        Ok(standings)
    }

    /// Emulate the draw and write the outcome back onto `competitors`.
    pub fn emulate(&self, competitors: &mut [Competitor]) -> Result<Standings> {
        let standings = self.play_draw(competitors)?;
        for (competitor, standing) in competitors.iter_mut().zip(&standings.entries) {
            competitor.terminated = standing.terminated;
            competitor.rounds_survived = standing.rounds_survived;
        }
        Ok(standings)
    }

    /// Play all matches of one round.
    pub fn play_round(
        &self,
        competitors: &[Competitor],
        standings: &mut Standings,
        round_index: usize,
    ) -> Result<()> {
        let round = self.round_name(round_index);
        info!("Emulating round {}", round);

        if competitors.len() != standings.len() {
            return Err(PoolError::InvalidInput(format!(
                "{} players given for a draw of {}",
                competitors.len(),
                standings.len()
            )));
        }

        let active = standings.active_slots();
        if active.len() % 2 != 0 {
            return Err(PoolError::MalformedBracket {
                round,
                active: active.len(),
            });
        }

        for &slot in &active {
            let player = &competitors[slot];
            standings.entries[slot].round_odds =
                player.round_odds(round_index).ok_or_else(|| {
                    PoolError::InvalidRoster(format!(
                        "{} has no probability for round {}",
                        player.name, round
                    ))
                })?;
        }

        for pair in active.chunks_exact(2) {
            let (one, two) = (pair[0], pair[1]);
            let side = match_winner(
                &standings.entries[one],
                &standings.entries[two],
                self.tie_break,
            )
            .ok_or_else(|| PoolError::TiedMatch {
                round: round.clone(),
                first: competitors[one].name.clone(),
                second: competitors[two].name.clone(),
            })?;

            let (winner, loser) = match side {
                Side::First => (one, two),
                Side::Second => (two, one),
            };

            standings.entries[loser].terminated = true;
            standings.entries[winner].rounds_survived += 1;

            debug!("{} d. {}", competitors[winner].name, competitors[loser].name);
        }

        standings.rounds_played += 1;
        Ok(())
    }

    fn round_name(&self, round_index: usize) -> String {
        self.rounds
            .get(round_index)
            .cloned()
            .unwrap_or_else(|| format!("#{}", round_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rounds(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("r{}", i)).collect()
    }

    fn standing(seed: u32, odds: f64) -> Standing {
        Standing {
            slot: 0,
            seed,
            round_odds: odds,
            terminated: false,
            rounds_survived: 0,
        }
    }

    // A beats B, C beats D, then C beats A. D has the best final-round odds
    // but is already out by then.
    fn make_simple_draw() -> Vec<Competitor> {
        vec![
            Competitor::new("A", 1, vec![0.9, 0.3]),
            Competitor::new("B", 0, vec![0.1, 0.05]),
            Competitor::new("C", 3, vec![0.6, 0.5]),
            Competitor::new("D", 0, vec![0.4, 0.9]),
        ]
    }

    #[test]
    fn test_match_winner_greater_odds() {
        let a = standing(0, 0.7);
        let b = standing(1, 0.3);
        assert_eq!(match_winner(&a, &b, TieBreak::LowerSeed), Some(Side::First));
        assert_eq!(match_winner(&b, &a, TieBreak::Reject), Some(Side::Second));
    }

    #[test]
    fn test_match_winner_ties() {
        let unseeded = standing(0, 0.5);
        let seeded = standing(12, 0.5);
        let top = standing(1, 0.5);

        assert_eq!(
            match_winner(&unseeded, &seeded, TieBreak::LowerSeed),
            Some(Side::Second)
        );
        assert_eq!(
            match_winner(&seeded, &top, TieBreak::LowerSeed),
            Some(Side::Second)
        );
        assert_eq!(
            match_winner(&unseeded, &standing(0, 0.5), TieBreak::LowerSeed),
            Some(Side::First)
        );
        assert_eq!(match_winner(&seeded, &top, TieBreak::Reject), None);
    }

    #[test]
    fn test_play_draw_simple() {
        let draw = make_simple_draw();
        let emulator = BracketEmulator::new(rounds(2), TieBreak::LowerSeed);
        let standings = emulator.play_draw(&draw).unwrap();

        assert_eq!(standings.rounds_survived(), vec![1, 0, 2, 0]);
        assert_eq!(standings.champion(), Some(2));
        assert_eq!(standings.rounds_played(), 2);
    }

    #[test]
    fn test_play_round_by_round() {
        let draw = make_simple_draw();
        let emulator = BracketEmulator::new(rounds(2), TieBreak::LowerSeed);
        let mut standings = Standings::new(&draw);

        emulator.play_round(&draw, &mut standings, 0).unwrap();
        assert_eq!(standings.active_slots(), vec![0, 2]);
        assert_eq!(standings.champion(), None);

        emulator.play_round(&draw, &mut standings, 1).unwrap();
        assert_eq!(standings.active_slots(), vec![2]);
    }

    #[test]
    fn test_emulate_writes_back() {
        let mut draw = make_simple_draw();
        let emulator = BracketEmulator::new(rounds(2), TieBreak::LowerSeed);
        emulator.emulate(&mut draw).unwrap();

        assert_eq!(draw[2].rounds_survived, 2);
        assert!(!draw[2].terminated);
        assert!(draw[3].terminated);
        assert_eq!(draw[0].rounds_survived, 1);
        assert!(draw[0].terminated);
    }

    #[test]
    fn test_odd_active_count_is_malformed() {
        let draw: Vec<Competitor> = (0..6)
            .map(|i| Competitor::new(format!("P{}", i), 0, vec![0.1 * i as f64, 0.5]))
            .collect();
        let emulator = BracketEmulator::new(rounds(2), TieBreak::LowerSeed);

        match emulator.play_draw(&draw) {
            Err(PoolError::MalformedBracket { round, active }) => {
                assert_eq!(round, "r1");
                assert_eq!(active, 3);
            }
            other => panic!("expected malformed bracket, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_tie_reports_players() {
        let draw = vec![
            Competitor::new("A", 1, vec![0.5]),
            Competitor::new("B", 2, vec![0.5]),
        ];
        let emulator = BracketEmulator::new(rounds(1), TieBreak::Reject);

        match emulator.play_draw(&draw) {
            Err(PoolError::TiedMatch { first, second, .. }) => {
                assert_eq!(first, "A");
                assert_eq!(second, "B");
            }
            other => panic!("expected tied match, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_into_by_name() {
        let draw = make_simple_draw();
        let emulator = BracketEmulator::new(rounds(2), TieBreak::LowerSeed);
        let standings = emulator.play_draw(&draw).unwrap();

        let mut table: Vec<Competitor> = draw.iter().rev().cloned().collect();
        standings.merge_into(&draw, &mut table).unwrap();

        let c = table.iter().find(|c| c.name == "C").unwrap();
        assert_eq!(c.rounds_survived, 2);
        let a = table.iter().find(|c| c.name == "A").unwrap();
        assert_eq!(a.rounds_survived, 1);
        assert!(a.terminated);
    }

    #[test]
    fn test_merge_into_missing_player() {
        let draw = make_simple_draw();
        let emulator = BracketEmulator::new(rounds(2), TieBreak::LowerSeed);
        let standings = emulator.play_draw(&draw).unwrap();

        let mut table = draw[..3].to_vec();
        assert!(standings.merge_into(&draw, &mut table).is_err());
    }

    #[test]
    fn test_short_probabilities_are_rejected() {
        let mut draw = make_simple_draw();
        draw[3].probabilities.truncate(1);
        let emulator = BracketEmulator::new(rounds(2), TieBreak::LowerSeed);

        // D loses in the first round, so only C runs out of odds.
        assert!(emulator.play_draw(&draw).is_ok());

        draw[2].probabilities.truncate(1);
        match emulator.play_draw(&draw) {
            Err(PoolError::InvalidRoster(message)) => {
                assert!(message.contains('C'));
                assert!(message.contains("r1"));
            }
            other => panic!("expected invalid roster, got {:?}", other),
        }
    }

    #[test]
    fn test_play_round_with_mismatched_draw() {
        let draw = make_simple_draw();
        let emulator = BracketEmulator::new(rounds(2), TieBreak::LowerSeed);
        let mut standings = Standings::new(&draw);

        assert!(matches!(
            emulator.play_round(&draw[..2], &mut standings, 0),
            Err(PoolError::InvalidInput(_))
        ));
        assert_eq!(standings.rounds_played(), 0);
    }
}
