//! Ordering of scored pairings by the caller's objective, and bucketing of statistical coverage
//! into confidence tiers.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::known::Schedule;
use crate::player::Pairing;

pub const HIGH_COVERAGE: f64 = 0.66;
pub const MEDIUM_COVERAGE: f64 = 0.33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Objective {
    #[default]
    MaxExpectedWins,
    MinimizeDownside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

/// Boundaries are inclusive on the higher tier. Non-finite coverage is [ConfidenceTier::Low].
pub fn confidence_tier(coverage: f64) -> ConfidenceTier {
    if coverage >= HIGH_COVERAGE {
        ConfidenceTier::High
    } else if coverage >= MEDIUM_COVERAGE {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

/// Mean sample reliability behind a score, at three granularities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coverage {
    /// Over every win-probability lookup made while scoring.
    pub overall: f64,
    /// Over our pairs' own statistics.
    pub game: f64,
    /// Over head-to-head lookups, counting fallbacks as zero.
    pub matchup: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Score {
    pub expected_wins: f64,
    pub floor_wins: f64,
    pub volatility: f64,
    pub coverage: Coverage,
    /// The number of games the expectation is taken over.
    pub games: usize,
}
impl Score {
    pub fn confidence(&self) -> ConfidenceTier {
        confidence_tier(self.coverage.overall)
    }

    /// Expected wins per game.
    pub fn win_probability(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.expected_wins / self.games as f64
        }
    }
}

/// A scored pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSetScore {
    pub id: String,
    pub pairing: Pairing,
    pub score: Score,
    pub schedule: Option<Schedule>,
}
impl PairSetScore {
    pub fn new(pairing: Pairing, score: Score, schedule: Option<Schedule>) -> Self {
        Self {
            id: pairing.id(),
            pairing,
            score,
            schedule,
        }
    }
}

pub trait Scored {
    fn score(&self) -> &Score;
}

impl Scored for Score {
    fn score(&self) -> &Score {
        self
    }
}

impl Scored for PairSetScore {
    fn score(&self) -> &Score {
        &self.score
    }
}

/// Orders `a` before `b` ([Ordering::Less]) when it is preferable under `objective`.
pub fn compare(a: &Score, b: &Score, objective: Objective) -> Ordering {
    let by_expected = b.expected_wins.total_cmp(&a.expected_wins);
    let by_floor = b.floor_wins.total_cmp(&a.floor_wins);
    let by_volatility = a.volatility.total_cmp(&b.volatility);
    match objective {
        Objective::MaxExpectedWins => by_expected.then(by_floor).then(by_volatility),
        Objective::MinimizeDownside => by_floor.then(by_expected).then(by_volatility),
    }
}

/// Sorts by preference under `objective`. The sort is stable, so exact ties retain their input
/// order.
pub fn rank<S: Scored>(mut scored: Vec<S>, objective: Objective) -> Vec<S> {
    scored.sort_by(|a, b| compare(a.score(), b.score(), objective));
    scored
}
