//! The optimiser entry point: scores every candidate pairing of a request's roster against a
//! feature bundle, ranks them by the request's objective, and assembles the leading pairings into
//! recommendations.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::blend::Blender;
use crate::bundle::FeatureBundle;
use crate::config::Config;
use crate::known::{Schedule, SlotAssignment};
use crate::lookup::StatsLookup;
use crate::player::{Gender, MatchType, Pair, Pairing, PlayerId};
use crate::rank::{confidence_tier, rank, ConfidenceTier, Objective, PairSetScore};
use crate::scenario::DEFAULT_DOWNSIDE_QUANTILE;
use crate::schedule::OpponentRound;
use crate::search::SearchStats;
use crate::{comb, known, scenario, search};


pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 3;
pub const DEFAULT_SCENARIO_LIMIT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    #[default]
    Blind,
    KnownOpponent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub division_id: Uuid,
    pub season_year: u16,
    pub season_number: u16,
    pub team_id: Uuid,
    pub opp_team_id: Uuid,
    #[serde(default)]
    pub matchup_id: Option<Uuid>,
    pub available_player_ids: Vec<PlayerId>,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub objective: Objective,
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    #[serde(default = "default_downside_quantile")]
    pub downside_quantile: f64,
    #[serde(default = "default_scenario_limit")]
    pub scenario_limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_rounds: Option<Vec<OpponentRound>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_roster: Option<BTreeMap<PlayerId, Gender>>,
}

fn default_max_recommendations() -> usize {
    DEFAULT_MAX_RECOMMENDATIONS
}

fn default_downside_quantile() -> f64 {
    DEFAULT_DOWNSIDE_QUANTILE
}

fn default_scenario_limit() -> usize {
    DEFAULT_SCENARIO_LIMIT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Strategy {
    Exhaustive,
    Search,
}

/// The ranked outcome of scoring one request.
#[derive(Debug)]
pub struct Evaluation {
    pub ranked: Vec<PairSetScore>,
    pub strategy: Strategy,
    pub scenario_count: usize,
    pub search_stats: Option<SearchStats>,
}

#[derive(Debug, Clone)]
pub struct Optimizer {
    config: Config,
    blender: Blender,
}

impl TryFrom<Config> for Optimizer {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        let blender = config.scoring_blender();
        Ok(Self { config, blender })
    }
}

impl Optimizer {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn strategy(&self, players: usize) -> Strategy {
        if players <= self.config.max_exhaustive_players {
            Strategy::Exhaustive
        } else {
            Strategy::Search
        }
    }

    /// Scores and ranks the candidate pairings of the request's roster. Gaps in the bundle
    /// degrade to neutral estimates. Requests are expected to have passed
    /// [validate_request](crate::validate::validate_request); failing that, repeated player IDs
    /// are dropped and a roster that cannot be paired yields no scores.
    pub fn evaluate(&self, request: &Request, bundle: &FeatureBundle) -> Evaluation {
        let start_time = Instant::now();
        let players = distinct(&request.available_player_ids);
        if players.len() != request.available_player_ids.len() {
            warn!(
                "dropped {} repeated player IDs from the roster of team {}",
                request.available_player_ids.len() - players.len(),
                request.team_id
            );
        }
        let players = &players[..];
        let mut lookup = StatsLookup::new(bundle, &self.blender);
        if let Some(roster) = &request.opponent_roster {
            lookup = lookup.with_genders(roster);
        }

        let scenarios = match request.mode {
            Mode::Blind => bundle.scenarios(request.scenario_limit),
            Mode::KnownOpponent => vec![],
        };
        if request.mode == Mode::Blind && scenarios.iter().all(|scenario| scenario.pairs.is_empty()) {
            warn!("no opponent scenarios for team {}; scoring against neutral odds", request.team_id);
        }
        let opponent_rounds = request.opponent_rounds.as_deref().unwrap_or(&[]);
        let quantile = request.downside_quantile;
        let aggregation = self.config.known_aggregation;
        let evaluate = |pairing: Pairing| match request.mode {
            Mode::Blind => {
                let score = scenario::score(&pairing, &scenarios, &lookup, quantile);
                PairSetScore::new(pairing, score, None)
            }
            Mode::KnownOpponent => {
                let (score, schedule) = known::score(&pairing, opponent_rounds, &lookup, quantile, aggregation);
                PairSetScore::new(pairing, score, Some(schedule))
            }
        };

        let strategy = self.strategy(players.len());
        debug!(
            "{} mode, {} players, {} possible pairings, strategy: {strategy}",
            request.mode,
            players.len(),
            comb::count_pairings(players.len())
        );
        let (ranked, search_stats) = match strategy {
            Strategy::Exhaustive => {
                let scored: Vec<_> = comb::enumerate(players).into_iter().map(evaluate).collect();
                (rank(scored, request.objective), None)
            }
            Strategy::Search => {
                let outcome = search::search(players, &self.config.search, request.objective, evaluate);
                debug!("search stats: {:?}", outcome.stats);
                (outcome.ranked, Some(outcome.stats))
            }
        };
        debug!("scored {} pairings in {:?}", ranked.len(), start_time.elapsed());

        Evaluation {
            ranked,
            strategy,
            scenario_count: scenarios.len(),
            search_stats,
        }
    }

    pub fn recommend(&self, request: &Request, bundle: &FeatureBundle) -> Vec<Recommendation> {
        let evaluation = self.evaluate(request, bundle);
        Recommendation::top(&evaluation.ranked, request.max_recommendations)
    }

    /// Produces the complete response. The request ID and timestamp are supplied by the caller.
    pub fn respond(
        &self,
        request: &Request,
        bundle: &FeatureBundle,
        request_id: Uuid,
        generated_at: DateTime<Utc>,
    ) -> Response {
        let evaluation = self.evaluate(request, bundle);
        let recommendations = Recommendation::top(&evaluation.ranked, request.max_recommendations);
        Response::assemble(
            request_id,
            generated_at,
            request,
            bundle,
            recommendations,
            evaluation.scenario_count,
            self.config.stale_after_hours,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairView {
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
}

impl From<&Pair> for PairView {
    fn from(pair: &Pair) -> Self {
        let [a, b] = pair.players();
        Self {
            player_a_id: a.clone(),
            player_b_id: b.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confidence {
    pub overall: ConfidenceTier,
    pub game: ConfidenceTier,
    pub matchup: ConfidenceTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub slot: usize,
    pub match_type: MatchType,
    /// Absent when the slot is forfeit.
    pub our_pair: Option<PairView>,
    pub opponent_pair: Option<PairView>,
    pub win_probability: f64,
}

impl SlotView {
    fn new(slot: usize, assignment: &SlotAssignment) -> Self {
        Self {
            slot: slot + 1,
            match_type: assignment.match_type,
            our_pair: assignment.ours.as_ref().map(PairView::from),
            opponent_pair: assignment.opponent.as_ref().map(PairView::from),
            win_probability: assignment.estimate.probability,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub round: usize,
    pub slots: Vec<SlotView>,
}

fn round_views(schedule: &Schedule) -> Vec<RoundView> {
    schedule
        .rounds
        .iter()
        .enumerate()
        .map(|(round, slots)| RoundView {
            round: round + 1,
            slots: slots
                .iter()
                .enumerate()
                .map(|(slot, assignment)| SlotView::new(slot, assignment))
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairUsage {
    pub pair: PairView,
    pub slots: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub rank: usize,
    pub pairing_id: String,
    pub pairs: Vec<PairView>,
    pub expected_wins: f64,
    #[serde(rename = "floorWinsQ20")]
    pub floor_wins: f64,
    pub matchup_win_probability: f64,
    pub volatility: f64,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<RoundView>>,
    #[serde(default)]
    pub pair_usage: Vec<PairUsage>,
}

impl Recommendation {
    /// Ranks are 1-based.
    pub fn new(rank: usize, scored: &PairSetScore) -> Self {
        let score = &scored.score;
        let pair_usage = match &scored.schedule {
            None => vec![],
            Some(schedule) => schedule
                .pair_usage(&scored.pairing)
                .iter()
                .map(|(pair, slots)| PairUsage {
                    pair: pair.into(),
                    slots: *slots,
                })
                .collect(),
        };
        Self {
            rank,
            pairing_id: scored.id.clone(),
            pairs: scored.pairing.pairs().iter().map(PairView::from).collect(),
            expected_wins: score.expected_wins,
            floor_wins: score.floor_wins,
            matchup_win_probability: score.win_probability(),
            volatility: score.volatility,
            confidence: Confidence {
                overall: score.confidence(),
                game: confidence_tier(score.coverage.game),
                matchup: confidence_tier(score.coverage.matchup),
            },
            schedule: scored.schedule.as_ref().map(round_views),
            pair_usage,
        }
    }

    pub fn top(ranked: &[PairSetScore], limit: usize) -> Vec<Self> {
        ranked
            .iter()
            .take(limit)
            .enumerate()
            .map(|(index, scored)| Self::new(index + 1, scored))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub scenario_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    pub generated_at: Option<DateTime<Utc>>,
    pub max_last_seen_at: Option<DateTime<Utc>>,
    pub data_staleness_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl BundleMetadata {
    pub fn new(bundle: &FeatureBundle, stale_after_hours: f64) -> Self {
        let warning = match bundle.data_staleness_hours {
            Some(hours) if hours > stale_after_hours => {
                warn!("feature bundle is {hours:.1} hours old");
                Some(format!(
                    "statistics are {hours:.1} hours old (threshold {stale_after_hours} hours); recommendations may not reflect recent results"
                ))
            }
            _ => None,
        };
        Self {
            generated_at: bundle.generated_at,
            max_last_seen_at: bundle.max_last_seen_at,
            data_staleness_hours: bundle.data_staleness_hours,
            warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub objective: Objective,
    pub recommendations: Vec<Recommendation>,
    pub scenario_summary: ScenarioSummary,
    pub bundle_metadata: BundleMetadata,
    pub player_directory: BTreeMap<PlayerId, String>,
}

impl Response {
    pub fn assemble(
        request_id: Uuid,
        generated_at: DateTime<Utc>,
        request: &Request,
        bundle: &FeatureBundle,
        recommendations: Vec<Recommendation>,
        scenario_count: usize,
        stale_after_hours: f64,
    ) -> Self {
        Self {
            request_id,
            generated_at,
            objective: request.objective,
            recommendations,
            scenario_summary: ScenarioSummary { scenario_count },
            bundle_metadata: BundleMetadata::new(bundle, stale_after_hours),
            player_directory: player_directory(&request.available_player_ids, bundle),
        }
    }
}

fn distinct(players: &[PlayerId]) -> Vec<PlayerId> {
    let mut seen = FxHashSet::default();
    players.iter().filter(|player| seen.insert(*player)).cloned().collect()
}

/// Display names for our roster (falling back to the ID) and for any other named catalog entries.
pub fn player_directory(players: &[PlayerId], bundle: &FeatureBundle) -> BTreeMap<PlayerId, String> {
    let mut directory: BTreeMap<_, _> = players
        .iter()
        .map(|player| (player.clone(), player.to_string()))
        .collect();
    for entry in &bundle.players_catalog {
        if let Some(name) = &entry.display_name {
            directory.insert(entry.player_id.clone(), name.clone());
        }
    }
    directory
}
