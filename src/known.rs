//! Scheduling against an opponent whose assignments are known for every round and slot.
//!
//! Each round is filled by global greedy matching: among all (slot, unused eligible pair)
//! combinations, the one with the highest win probability is fixed first, and so on until the
//! round is full or no eligible pair remains. Slots left without an eligible pair are forfeits.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::lookup::{Source, StatsLookup, WinEstimate};
use crate::player::{MatchType, Pair, Pairing};
use crate::probs::SliceExt;
use crate::rank::{Coverage, Score};
use crate::schedule::{opponent_at, OpponentRound, ROUNDS, SLOTS, TEMPLATE};

#[derive(Debug, Clone, PartialEq)]
pub struct SlotAssignment {
    pub match_type: MatchType,
    pub opponent: Option<Pair>,
    /// `None` when no eligible pair was available.
    pub ours: Option<Pair>,
    pub estimate: WinEstimate,
}
impl SlotAssignment {
    fn forfeit(match_type: MatchType, opponent: Option<Pair>) -> Self {
        Self {
            match_type,
            opponent,
            ours: None,
            estimate: WinEstimate {
                probability: 0.0,
                reliability: 0.0,
                source: Source::Default,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub rounds: Vec<Vec<SlotAssignment>>,
}
impl Schedule {
    pub fn slots(&self) -> impl Iterator<Item = &SlotAssignment> {
        self.rounds.iter().flatten()
    }

    pub fn round_wins(&self) -> Vec<f64> {
        self.rounds
            .iter()
            .map(|slots| slots.iter().map(|slot| slot.estimate.probability).sum())
            .collect()
    }

    pub fn slot_wins(&self) -> Vec<f64> {
        self.slots().map(|slot| slot.estimate.probability).collect()
    }

    pub fn filled(&self) -> usize {
        self.slots().filter(|slot| slot.ours.is_some()).count()
    }

    /// The number of slots each of the pairing's pairs plays, in pairing order.
    pub fn pair_usage(&self, pairing: &Pairing) -> Vec<(Pair, usize)> {
        pairing
            .pairs()
            .iter()
            .map(|pair| {
                let count = self.slots().filter(|slot| slot.ours.as_ref() == Some(pair)).count();
                (pair.clone(), count)
            })
            .collect()
    }
}

/// The sampling unit over which the downside quantile and volatility are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Aggregation {
    #[default]
    PerRound,
    PerSlot,
}
impl Aggregation {
    /// Returns `(floor_wins, volatility)` on the scale of the whole schedule: the quantile unit
    /// is scaled up by the number of units, and the unit spread by its square root.
    pub fn summarise(&self, schedule: &Schedule, downside_quantile: f64) -> (f64, f64) {
        let units = match self {
            Aggregation::PerRound => schedule.round_wins(),
            Aggregation::PerSlot => schedule.slot_wins(),
        };
        let count = units.len() as f64;
        (units.quantile(downside_quantile) * count, units.stdev() * count.sqrt())
    }
}

pub fn schedule(pairing: &Pairing, opponent_rounds: &[OpponentRound], lookup: &StatsLookup) -> Schedule {
    let rounds = (0..ROUNDS)
        .map(|round| schedule_round(pairing, opponent_rounds, round, lookup))
        .collect();
    Schedule { rounds }
}

fn schedule_round(
    pairing: &Pairing,
    opponent_rounds: &[OpponentRound],
    round: usize,
    lookup: &StatsLookup,
) -> Vec<SlotAssignment> {
    let opponents: Vec<_> = (0..SLOTS).map(|slot| opponent_at(opponent_rounds, round, slot)).collect();
    let mut candidates = vec![];
    for (slot, opponent) in opponents.iter().enumerate() {
        let match_type = TEMPLATE[round][slot];
        for (pair_index, ours) in pairing.pairs().iter().enumerate() {
            if !match_type.admits(lookup.genders(ours)) {
                continue;
            }
            let estimate = match opponent {
                Some(theirs) => lookup.matchup(ours, theirs, Some(match_type)),
                None => lookup.candidate(ours, Some(match_type)),
            };
            candidates.push((slot, pair_index, estimate));
        }
    }
    candidates.sort_by(|(a_slot, a_pair, a), (b_slot, b_pair, b)| {
        b.probability
            .total_cmp(&a.probability)
            .then(a_slot.cmp(b_slot))
            .then(a_pair.cmp(b_pair))
    });

    let mut assignments: Vec<_> = opponents
        .iter()
        .enumerate()
        .map(|(slot, opponent)| SlotAssignment::forfeit(TEMPLATE[round][slot], opponent.clone()))
        .collect();
    let mut slot_taken = [false; SLOTS];
    let mut pair_taken = vec![false; pairing.len()];
    for (slot, pair_index, estimate) in candidates {
        if slot_taken[slot] || pair_taken[pair_index] {
            continue;
        }
        slot_taken[slot] = true;
        pair_taken[pair_index] = true;
        assignments[slot].ours = Some(pairing.pairs()[pair_index].clone());
        assignments[slot].estimate = estimate;
    }
    assignments
}

pub fn score(
    pairing: &Pairing,
    opponent_rounds: &[OpponentRound],
    lookup: &StatsLookup,
    downside_quantile: f64,
    aggregation: Aggregation,
) -> (Score, Schedule) {
    let schedule = schedule(pairing, opponent_rounds, lookup);
    let (floor_wins, volatility) = aggregation.summarise(&schedule, downside_quantile);
    let reliabilities: Vec<_> = schedule.slots().map(|slot| slot.estimate.reliability).collect();
    let matchup_reliabilities: Vec<_> = schedule
        .slots()
        .map(|slot| slot.estimate.matchup_reliability())
        .collect();
    let score = Score {
        expected_wins: schedule.slot_wins().sum(),
        floor_wins,
        volatility,
        coverage: Coverage {
            overall: reliabilities.mean(),
            game: lookup.game_coverage(pairing),
            matchup: matchup_reliabilities.mean(),
        },
        games: schedule.filled(),
    };
    (score, schedule)
}
