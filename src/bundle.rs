//! The pre-aggregated feature bundle supplied by the data layer for one recommendation request.
//! Missing arrays deserialise as empty and are treated as "no data".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::player::{Gender, MatchType, Pair, PlayerId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBundle {
    #[serde(default)]
    pub candidate_pairs: Vec<CandidatePairStat>,

    #[serde(default)]
    pub opponent_scenarios: Vec<OpponentScenario>,

    #[serde(default)]
    pub pair_matchups: Vec<PairMatchup>,

    #[serde(default)]
    pub players_catalog: Vec<CatalogPlayer>,

    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub max_last_seen_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub data_staleness_hours: Option<f64>,
}

/// Per-category statistics for one of our candidate pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePairStat {
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
    pub match_type: MatchType,
    pub win_rate_shrunk: f64,
    #[serde(default)]
    pub pd_win_probability: Option<f64>,
    #[serde(default)]
    pub reliability: f64,
    #[serde(default)]
    pub signal_correlation: Option<f64>,
}
impl CandidatePairStat {
    pub fn pair(&self) -> Option<Pair> {
        Pair::try_new(self.player_a_id.clone(), self.player_b_id.clone())
    }
}

/// A hypothesised full opponent pairing and its probability weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentScenario {
    #[serde(default)]
    pub scenario_id: Option<String>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub pairs: Vec<PairIds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairIds {
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
}
impl PairIds {
    pub fn pair(&self) -> Option<Pair> {
        Pair::try_new(self.player_a_id.clone(), self.player_b_id.clone())
    }
}

/// A head-to-head statistic for one of our pairs against a specific opponent pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairMatchup {
    pub our_player_a_id: PlayerId,
    pub our_player_b_id: PlayerId,
    pub opp_player_a_id: PlayerId,
    pub opp_player_b_id: PlayerId,
    pub match_type: MatchType,
    pub win_rate_shrunk: f64,
    #[serde(default)]
    pub pd_win_probability: Option<f64>,
    #[serde(default)]
    pub reliability: f64,
    #[serde(default)]
    pub signal_correlation: Option<f64>,
}
impl PairMatchup {
    pub fn pairs(&self) -> Option<(Pair, Pair)> {
        let ours = Pair::try_new(self.our_player_a_id.clone(), self.our_player_b_id.clone())?;
        let theirs = Pair::try_new(self.opp_player_a_id.clone(), self.opp_player_b_id.clone())?;
        Some((ours, theirs))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPlayer {
    pub player_id: PlayerId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// A resolved opponent scenario, ready for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub weight: f64,
    pub pairs: Vec<Pair>,
}

impl FeatureBundle {
    /// The first `limit` scenarios, with malformed opponent pairs dropped. Weights are carried as
    /// supplied (missing weights as zero); normalisation happens at scoring time.
    pub fn scenarios(&self, limit: usize) -> Vec<Scenario> {
        self.opponent_scenarios
            .iter()
            .take(limit)
            .map(|scenario| Scenario {
                weight: scenario.probability.unwrap_or(0.0),
                pairs: scenario.pairs.iter().filter_map(PairIds::pair).collect(),
            })
            .collect()
    }
}
