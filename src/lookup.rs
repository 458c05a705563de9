//! Indexed access to the statistics of a [FeatureBundle]. Every lookup yields a blended, clamped
//! [WinEstimate]; gaps in the data degrade to the candidate statistic and then to a neutral
//! default rather than failing.

use rustc_hash::FxHashMap;
use strum::IntoEnumIterator;

use crate::blend::{Blender, NEUTRAL_PROBABILITY};
use crate::bundle::{CandidatePairStat, FeatureBundle, PairMatchup};
use crate::player::{Gender, MatchType, Pair, Pairing, PlayerId};
use crate::probs::SliceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Matchup,
    Candidate,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinEstimate {
    pub probability: f64,
    pub reliability: f64,
    pub source: Source,
}
impl WinEstimate {
    pub const NEUTRAL: WinEstimate = WinEstimate {
        probability: NEUTRAL_PROBABILITY,
        reliability: 0.0,
        source: Source::Default,
    };

    /// Reliability attributable to a head-to-head statistic; zero for fallbacks.
    pub fn matchup_reliability(&self) -> f64 {
        match self.source {
            Source::Matchup => self.reliability,
            _ => 0.0,
        }
    }
}

pub struct StatsLookup<'a> {
    blender: &'a Blender,
    candidates: FxHashMap<(Pair, MatchType), &'a CandidatePairStat>,
    matchups: FxHashMap<(Pair, Pair, MatchType), &'a PairMatchup>,
    genders: FxHashMap<PlayerId, Gender>,
}
impl<'a> StatsLookup<'a> {
    pub fn new(bundle: &'a FeatureBundle, blender: &'a Blender) -> Self {
        let mut candidates = FxHashMap::with_capacity_and_hasher(bundle.candidate_pairs.len(), Default::default());
        for stat in &bundle.candidate_pairs {
            if let Some(pair) = stat.pair() {
                candidates.insert((pair, stat.match_type), stat);
            }
        }
        let mut matchups = FxHashMap::with_capacity_and_hasher(bundle.pair_matchups.len(), Default::default());
        for matchup in &bundle.pair_matchups {
            if let Some((ours, theirs)) = matchup.pairs() {
                matchups.insert((ours, theirs, matchup.match_type), matchup);
            }
        }
        let genders = bundle
            .players_catalog
            .iter()
            .filter_map(|player| player.gender.map(|gender| (player.player_id.clone(), gender)))
            .collect();
        Self {
            blender,
            candidates,
            matchups,
            genders,
        }
    }

    /// Supplements (and overrides) the catalog genders, e.g. with the opponent roster.
    pub fn with_genders<'g>(mut self, genders: impl IntoIterator<Item = (&'g PlayerId, &'g Gender)>) -> Self {
        for (player, &gender) in genders {
            self.genders.insert(player.clone(), gender);
        }
        self
    }

    pub fn gender(&self, player: &PlayerId) -> Option<Gender> {
        self.genders.get(player).copied()
    }

    pub fn genders(&self, pair: &Pair) -> [Option<Gender>; 2] {
        let [a, b] = pair.players();
        [self.gender(a), self.gender(b)]
    }

    /// The category implied by the pair's genders, if known.
    pub fn composition(&self, pair: &Pair) -> Option<MatchType> {
        MatchType::of(self.genders(pair))
    }

    /// Whether two pairs could meet: compositions equal, or either unknown.
    pub fn compatible(&self, ours: &Pair, theirs: &Pair) -> bool {
        match (self.composition(ours), self.composition(theirs)) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => true,
        }
    }

    /// Our pair's own statistic. Without a `match_type`, the category implied by the pair's
    /// genders is used when known, otherwise the most reliable category on record.
    pub fn candidate(&self, pair: &Pair, match_type: Option<MatchType>) -> WinEstimate {
        let stat = match match_type.or_else(|| self.composition(pair)) {
            Some(match_type) => self.candidates.get(&(pair.clone(), match_type)).copied(),
            None => MatchType::iter()
                .filter_map(|match_type| self.candidates.get(&(pair.clone(), match_type)).copied())
                .fold(None, |best: Option<&CandidatePairStat>, stat| match best {
                    Some(best) if best.reliability >= stat.reliability => Some(best),
                    _ => Some(stat),
                }),
        };
        match stat {
            None => WinEstimate::NEUTRAL,
            Some(stat) => self.estimate(
                stat.win_rate_shrunk,
                stat.pd_win_probability,
                stat.reliability,
                stat.signal_correlation,
                Source::Candidate,
            ),
        }
    }

    /// Our pair against a specific opponent pair, falling back to [Self::candidate].
    pub fn matchup(&self, ours: &Pair, theirs: &Pair, match_type: Option<MatchType>) -> WinEstimate {
        let match_type = match_type
            .or_else(|| self.composition(ours))
            .or_else(|| self.composition(theirs));
        let matchup = match match_type {
            Some(match_type) => self.matchups.get(&(ours.clone(), theirs.clone(), match_type)).copied(),
            None => MatchType::iter()
                .filter_map(|match_type| self.matchups.get(&(ours.clone(), theirs.clone(), match_type)).copied())
                .fold(None, |best: Option<&PairMatchup>, matchup| match best {
                    Some(best) if best.reliability >= matchup.reliability => Some(best),
                    _ => Some(matchup),
                }),
        };
        match matchup {
            None => self.candidate(ours, match_type),
            Some(matchup) => self.estimate(
                matchup.win_rate_shrunk,
                matchup.pd_win_probability,
                matchup.reliability,
                matchup.signal_correlation,
                Source::Matchup,
            ),
        }
    }

    /// Mean reliability of the pairing's own candidate statistics.
    pub fn game_coverage(&self, pairing: &Pairing) -> f64 {
        let reliabilities: Vec<_> = pairing
            .pairs()
            .iter()
            .map(|pair| self.candidate(pair, None).reliability)
            .collect();
        reliabilities.mean()
    }

    fn estimate(
        &self,
        win_rate: f64,
        pd_win_prob: Option<f64>,
        reliability: f64,
        signal_correlation: Option<f64>,
        source: Source,
    ) -> WinEstimate {
        let blended = self.blender.blend(win_rate, pd_win_prob, reliability, signal_correlation);
        WinEstimate {
            probability: self.blender.bounds.clamp(blended),
            reliability: if reliability.is_finite() {
                reliability.clamp(0.0, 1.0)
            } else {
                0.0
            },
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;
    use crate::bundle::CatalogPlayer;
    use crate::testing::{candidate, matchup, pair};

    fn catalog(genders: &[(&str, Gender)]) -> Vec<CatalogPlayer> {
        genders
            .iter()
            .map(|(player, gender)| CatalogPlayer {
                player_id: (*player).into(),
                display_name: None,
                gender: Some(*gender),
            })
            .collect()
    }

    #[test]
    fn missing_data_is_neutral() {
        let bundle = FeatureBundle::default();
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);
        assert_eq!(WinEstimate::NEUTRAL, lookup.candidate(&pair("a", "b"), None));
        assert_eq!(
            WinEstimate::NEUTRAL,
            lookup.matchup(&pair("a", "b"), &pair("x", "y"), Some(MatchType::Mixed))
        );
    }

    #[test]
    fn matchup_falls_back_to_candidate() {
        let bundle = FeatureBundle {
            candidate_pairs: vec![candidate("a", "b", MatchType::Mixed, 0.7, 0.6)],
            ..FeatureBundle::default()
        };
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);
        let estimate = lookup.matchup(&pair("b", "a"), &pair("x", "y"), Some(MatchType::Mixed));
        assert_eq!(Source::Candidate, estimate.source);
        assert_f64_near!(0.7, estimate.probability);
        assert_f64_near!(0.6, estimate.reliability);
        assert_eq!(0.0, estimate.matchup_reliability());

        let estimate = lookup.matchup(&pair("a", "b"), &pair("x", "y"), Some(MatchType::Female));
        assert_eq!(WinEstimate::NEUTRAL, estimate);
    }

    #[test]
    fn matchup_preferred_over_candidate() {
        let bundle = FeatureBundle {
            candidate_pairs: vec![candidate("a", "b", MatchType::Mixed, 0.7, 0.6)],
            pair_matchups: vec![matchup(("a", "b"), ("x", "y"), MatchType::Mixed, 0.4, 0.9)],
            ..FeatureBundle::default()
        };
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);
        let estimate = lookup.matchup(&pair("a", "b"), &pair("y", "x"), None);
        assert_eq!(Source::Matchup, estimate.source);
        assert_f64_near!(0.4, estimate.probability);
        assert_f64_near!(0.9, estimate.matchup_reliability());
    }

    #[test]
    fn point_differential_signal_is_blended() {
        let bundle = FeatureBundle {
            candidate_pairs: vec![CandidatePairStat {
                pd_win_probability: Some(0.7),
                signal_correlation: Some(1.0),
                ..candidate("a", "b", MatchType::Mixed, 0.6, 1.0)
            }],
            pair_matchups: vec![PairMatchup {
                pd_win_probability: Some(0.3),
                signal_correlation: Some(1.0),
                ..matchup(("a", "b"), ("x", "y"), MatchType::Mixed, 0.4, 1.0)
            }],
            ..FeatureBundle::default()
        };
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);

        // weight 0.5 × 0.8 agreement = 0.4 toward the point-differential estimate
        let estimate = lookup.candidate(&pair("a", "b"), Some(MatchType::Mixed));
        assert_eq!(Source::Candidate, estimate.source);
        assert_float_absolute_eq!(0.64, estimate.probability, 1e-12);

        let estimate = lookup.matchup(&pair("a", "b"), &pair("x", "y"), None);
        assert_eq!(Source::Matchup, estimate.source);
        assert_float_absolute_eq!(0.36, estimate.probability, 1e-12);

        let estimate = lookup.matchup(&pair("a", "b"), &pair("w", "z"), Some(MatchType::Mixed));
        assert_eq!(Source::Candidate, estimate.source);
        assert_float_absolute_eq!(0.64, estimate.probability, 1e-12);
    }

    #[test]
    fn probabilities_are_clamped_for_scoring() {
        let bundle = FeatureBundle {
            candidate_pairs: vec![candidate("a", "b", MatchType::Male, 0.99, 1.0)],
            ..FeatureBundle::default()
        };
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);
        assert_f64_near!(0.95, lookup.candidate(&pair("a", "b"), None).probability);
    }

    #[test]
    fn candidate_category_from_genders() {
        let bundle = FeatureBundle {
            candidate_pairs: vec![
                candidate("a", "b", MatchType::Mixed, 0.7, 0.9),
                candidate("a", "b", MatchType::Female, 0.3, 0.2),
            ],
            players_catalog: catalog(&[("a", Gender::Female), ("b", Gender::Female)]),
            ..FeatureBundle::default()
        };
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);
        assert_eq!(Some(MatchType::Female), lookup.composition(&pair("a", "b")));
        assert_f64_near!(0.3, lookup.candidate(&pair("a", "b"), None).probability);
    }

    #[test]
    fn candidate_most_reliable_when_genders_unknown() {
        let bundle = FeatureBundle {
            candidate_pairs: vec![
                candidate("a", "b", MatchType::Mixed, 0.7, 0.2),
                candidate("a", "b", MatchType::Female, 0.3, 0.8),
            ],
            ..FeatureBundle::default()
        };
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);
        assert_f64_near!(0.3, lookup.candidate(&pair("a", "b"), None).probability);
    }

    #[test]
    fn compatibility() {
        let bundle = FeatureBundle {
            players_catalog: catalog(&[
                ("a", Gender::Female),
                ("b", Gender::Male),
                ("x", Gender::Male),
                ("y", Gender::Male),
            ]),
            ..FeatureBundle::default()
        };
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);
        assert!(!lookup.compatible(&pair("a", "b"), &pair("x", "y")));
        assert!(lookup.compatible(&pair("a", "b"), &pair("x", "z")));

        let roster = [(PlayerId::from("z"), Gender::Female)];
        let lookup = lookup.with_genders(roster.iter().map(|(player, gender)| (player, gender)));
        assert!(lookup.compatible(&pair("a", "b"), &pair("x", "z")));
        assert!(!lookup.compatible(&pair("x", "y"), &pair("x", "z")));
    }

    #[test]
    fn game_coverage() {
        let bundle = FeatureBundle {
            candidate_pairs: vec![candidate("a", "b", MatchType::Mixed, 0.7, 0.6)],
            ..FeatureBundle::default()
        };
        let blender = Blender::scoring();
        let lookup = StatsLookup::new(&bundle, &blender);
        let pairing = Pairing::new(vec![pair("a", "b"), pair("c", "d")]);
        assert_f64_near!(0.3, lookup.game_coverage(&pairing));
    }
}
