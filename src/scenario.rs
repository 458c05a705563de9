//! Scoring of a pairing against a probability-weighted set of hypothesised opponent pairings.
//!
//! Within each scenario every one of our pairs is credited with its best win probability against
//! any compatible opponent pair in that scenario. This is a greedy best response per pair, not an
//! optimal assignment across pairs, so two of our pairs may both be credited against the same
//! opponent.

use crate::blend::NEUTRAL_PROBABILITY;
use crate::bundle::Scenario;
use crate::lookup::{StatsLookup, WinEstimate};
use crate::player::{Pair, Pairing};
use crate::probs::{normalise_weights, SliceExt};
use crate::rank::{Coverage, Score};

pub const DEFAULT_DOWNSIDE_QUANTILE: f64 = 0.2;

pub fn score(pairing: &Pairing, scenarios: &[Scenario], lookup: &StatsLookup, downside_quantile: f64) -> Score {
    let ours = pairing.pairs();
    let games = ours.len();
    let neutral_wins = NEUTRAL_PROBABILITY * games as f64;
    let game_coverage = lookup.game_coverage(pairing);
    if ours.is_empty() || scenarios.iter().all(|scenario| scenario.pairs.is_empty()) {
        return Score {
            expected_wins: neutral_wins,
            floor_wins: neutral_wins,
            volatility: 0.0,
            coverage: Coverage {
                overall: 0.0,
                game: game_coverage,
                matchup: 0.0,
            },
            games,
        };
    }

    let mut weights: Vec<_> = scenarios.iter().map(|scenario| scenario.weight).collect();
    normalise_weights(&mut weights);

    let mut scenario_wins = Vec::with_capacity(scenarios.len());
    let mut reliabilities = Vec::with_capacity(scenarios.len() * games);
    let mut matchup_reliabilities = Vec::with_capacity(scenarios.len() * games);
    for scenario in scenarios {
        let mut wins = 0.0;
        for pair in ours {
            let estimate = best_response(pair, &scenario.pairs, lookup);
            wins += estimate.probability;
            reliabilities.push(estimate.reliability);
            matchup_reliabilities.push(estimate.matchup_reliability());
        }
        scenario_wins.push(wins);
    }

    let expected_wins = scenario_wins.weighted_mean(&weights);
    Score {
        expected_wins,
        floor_wins: scenario_wins.quantile(downside_quantile),
        volatility: scenario_wins.weighted_stdev(&weights, expected_wins),
        coverage: Coverage {
            overall: reliabilities.mean(),
            game: game_coverage,
            matchup: matchup_reliabilities.mean(),
        },
        games,
    }
}

/// Our pair's highest win probability against any compatible opponent pair; neutral when there
/// is none. Ties go to the first opponent listed.
pub fn best_response(ours: &Pair, opponents: &[Pair], lookup: &StatsLookup) -> WinEstimate {
    let mut best: Option<WinEstimate> = None;
    for theirs in opponents {
        if !lookup.compatible(ours, theirs) {
            continue;
        }
        let estimate = lookup.matchup(ours, theirs, None);
        match best {
            Some(current) if current.probability >= estimate.probability => {}
            _ => best = Some(estimate),
        }
    }
    best.unwrap_or(WinEstimate::NEUTRAL)
}
