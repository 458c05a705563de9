use criterion::{criterion_group, criterion_main, Criterion};
use tinyrand::{Rand, Seeded, StdRand};

use lineup::blend::Blender;
use lineup::bundle::{CandidatePairStat, FeatureBundle, OpponentScenario, PairIds, PairMatchup};
use lineup::comb::enumerate;
use lineup::known::{self, Aggregation};
use lineup::lookup::StatsLookup;
use lineup::player::{MatchType, PlayerId};
use lineup::scenario;
use lineup::schedule::{OpponentRound, OpponentSlot, ROUNDS, SLOTS, TEMPLATE};

fn roster(prefix: char, players: usize) -> Vec<PlayerId> {
    (1..=players).map(|player| PlayerId::new(format!("{prefix}{player:02}"))).collect()
}

fn probability(rand: &mut StdRand) -> f64 {
    (20 + rand.next_lim_u32(60)) as f64 / 100.0
}

fn fixture(players: usize) -> FeatureBundle {
    let mut rand = StdRand::seed(42);
    let ours = roster('p', players);
    let theirs = roster('o', players);
    let mut candidate_pairs = vec![];
    let mut pair_matchups = vec![];
    for (index, a) in ours.iter().enumerate() {
        for b in &ours[index + 1..] {
            candidate_pairs.push(CandidatePairStat {
                player_a_id: a.clone(),
                player_b_id: b.clone(),
                match_type: MatchType::Mixed,
                win_rate_shrunk: probability(&mut rand),
                pd_win_probability: Some(probability(&mut rand)),
                reliability: probability(&mut rand),
                signal_correlation: Some(0.5),
            });
            for opponents in theirs.chunks_exact(2) {
                pair_matchups.push(PairMatchup {
                    our_player_a_id: a.clone(),
                    our_player_b_id: b.clone(),
                    opp_player_a_id: opponents[0].clone(),
                    opp_player_b_id: opponents[1].clone(),
                    match_type: MatchType::Mixed,
                    win_rate_shrunk: probability(&mut rand),
                    pd_win_probability: None,
                    reliability: probability(&mut rand),
                    signal_correlation: None,
                });
            }
        }
    }
    let opponent_scenarios = (0..12)
        .map(|_| {
            let offset = rand.next_lim_usize(theirs.len());
            let rotated: Vec<_> = theirs.iter().cycle().skip(offset).take(theirs.len()).collect();
            OpponentScenario {
                scenario_id: None,
                probability: Some(probability(&mut rand)),
                pairs: rotated
                    .chunks_exact(2)
                    .map(|pair| PairIds {
                        player_a_id: pair[0].clone(),
                        player_b_id: pair[1].clone(),
                    })
                    .collect(),
            }
        })
        .collect();
    FeatureBundle {
        candidate_pairs,
        opponent_scenarios,
        pair_matchups,
        ..FeatureBundle::default()
    }
}

fn opponent_rounds(players: usize) -> Vec<OpponentRound> {
    let theirs = roster('o', players);
    (0..ROUNDS)
        .map(|round| OpponentRound {
            slots: (0..SLOTS)
                .map(|slot| OpponentSlot {
                    match_type: TEMPLATE[round][slot],
                    opponent_player_a_id: theirs[(slot * 2) % players].clone(),
                    opponent_player_b_id: theirs[(slot * 2 + 1) % players].clone(),
                })
                .collect(),
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    for players in [8, 10] {
        let bundle = fixture(players);
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);
        let scenarios = bundle.scenarios(12);
        let pairings = enumerate(&roster('p', players));
        let rounds = opponent_rounds(players);

        c.bench_function(&format!("cri_score_blind_{players}"), |b| {
            b.iter(|| {
                pairings
                    .iter()
                    .map(|pairing| scenario::score(pairing, &scenarios, &lookup, 0.2).expected_wins)
                    .sum::<f64>()
            });
        });
        c.bench_function(&format!("cri_score_known_{players}"), |b| {
            b.iter(|| {
                pairings
                    .iter()
                    .map(|pairing| known::score(pairing, &rounds, &lookup, 0.2, Aggregation::PerRound).0.expected_wins)
                    .sum::<f64>()
            });
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
