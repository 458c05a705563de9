//! Testing helpers and fixtures.

use assert_float_eq::*;

use crate::bundle::{CandidatePairStat, CatalogPlayer, FeatureBundle, OpponentScenario, PairIds, PairMatchup};
use crate::player::{Gender, MatchType, Pair, PlayerId};
use crate::schedule::{OpponentRound, OpponentSlot, ROUNDS, SLOTS, TEMPLATE};

pub fn assert_slice_f64_near(expected: &[f64], actual: &[f64], distance: u32) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_f64_near!(expected, actual, distance);
        }
    }
}

/// Players `p01`, `p02`, ... `pNN`.
pub fn players(count: usize) -> Vec<PlayerId> {
    (1..=count).map(|index| PlayerId::new(format!("p{index:02}"))).collect()
}

/// Opponents `o01`, `o02`, ... `oNN`.
pub fn opponents(count: usize) -> Vec<PlayerId> {
    (1..=count).map(|index| PlayerId::new(format!("o{index:02}"))).collect()
}

pub fn pair(first: &str, second: &str) -> Pair {
    Pair::new(first.into(), second.into())
}

pub fn candidate(first: &str, second: &str, match_type: MatchType, win_rate: f64, reliability: f64) -> CandidatePairStat {
    CandidatePairStat {
        player_a_id: first.into(),
        player_b_id: second.into(),
        match_type,
        win_rate_shrunk: win_rate,
        pd_win_probability: None,
        reliability,
        signal_correlation: None,
    }
}

pub fn matchup(
    ours: (&str, &str),
    theirs: (&str, &str),
    match_type: MatchType,
    win_rate: f64,
    reliability: f64,
) -> PairMatchup {
    PairMatchup {
        our_player_a_id: ours.0.into(),
        our_player_b_id: ours.1.into(),
        opp_player_a_id: theirs.0.into(),
        opp_player_b_id: theirs.1.into(),
        match_type,
        win_rate_shrunk: win_rate,
        pd_win_probability: None,
        reliability,
        signal_correlation: None,
    }
}

pub fn scenario(probability: Option<f64>, pairs: &[(&str, &str)]) -> OpponentScenario {
    OpponentScenario {
        scenario_id: None,
        probability,
        pairs: pairs
            .iter()
            .map(|(first, second)| PairIds {
                player_a_id: (*first).into(),
                player_b_id: (*second).into(),
            })
            .collect(),
    }
}

/// Odd-numbered players are female, even-numbered male.
pub fn alternating_genders(players: &[PlayerId]) -> Vec<(PlayerId, Gender)> {
    players
        .iter()
        .enumerate()
        .map(|(index, player)| {
            let gender = if index % 2 == 0 { Gender::Female } else { Gender::Male };
            (player.clone(), gender)
        })
        .collect()
}

/// A bundle for 8 of our players against 8 opponents: candidate stats that favour the pairs
/// `p01|p02`, `p03|p04`, `p05|p06` and `p07|p08`, three opponent scenarios and a couple of
/// head-to-head matchups.
pub fn bundle_8v8() -> FeatureBundle {
    let ours = players(8);
    let mut candidate_pairs = vec![];
    for (index, first) in ours.iter().enumerate() {
        for (offset, second) in ours[index + 1..].iter().enumerate() {
            let favoured = offset == 0 && index % 2 == 0;
            let win_rate = if favoured { 0.65 } else { 0.45 };
            for match_type in [MatchType::Mixed, MatchType::Female, MatchType::Male] {
                candidate_pairs.push(candidate(first.as_str(), second.as_str(), match_type, win_rate, 0.5));
            }
        }
    }
    FeatureBundle {
        candidate_pairs,
        opponent_scenarios: vec![
            scenario(Some(0.5), &[("o01", "o02"), ("o03", "o04"), ("o05", "o06"), ("o07", "o08")]),
            scenario(Some(0.3), &[("o01", "o03"), ("o02", "o04"), ("o05", "o07"), ("o06", "o08")]),
            scenario(Some(0.2), &[("o01", "o04"), ("o02", "o03"), ("o05", "o08"), ("o06", "o07")]),
        ],
        pair_matchups: vec![
            matchup(("p01", "p02"), ("o01", "o02"), MatchType::Mixed, 0.8, 0.9),
            matchup(("p03", "p04"), ("o01", "o02"), MatchType::Mixed, 0.3, 0.9),
        ],
        players_catalog: ours
            .iter()
            .map(|player| CatalogPlayer {
                player_id: player.clone(),
                display_name: Some(format!("Player {}", player.as_str().trim_start_matches('p'))),
                gender: None,
            })
            .collect(),
        generated_at: None,
        max_last_seen_at: None,
        data_staleness_hours: Some(2.0),
    }
}

/// A full 8×4 opponent schedule cycling through the opponent pairs `o01|o02` ... `o07|o08`.
pub fn opponent_rounds_8() -> Vec<OpponentRound> {
    let opponents = opponents(8);
    (0..ROUNDS)
        .map(|round| OpponentRound {
            slots: (0..SLOTS)
                .map(|slot| OpponentSlot {
                    match_type: TEMPLATE[round][slot],
                    opponent_player_a_id: opponents[slot * 2].clone(),
                    opponent_player_b_id: opponents[slot * 2 + 1].clone(),
                })
                .collect(),
        })
        .collect()
}
