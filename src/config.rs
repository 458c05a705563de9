//! Optimiser configuration. Every field has a default, so a partial JSON document (or none at all)
//! is a valid configuration.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::blend::{Blender, ProbabilityBounds, CALIBRATION_BOUNDS, DEFAULT_MAX_SECONDARY_WEIGHT, SCORING_BOUNDS};
use crate::known::Aggregation;
use crate::search::SearchConfig;

/// Beyond this many players, exhaustive enumeration gives way to approximate search.
pub const DEFAULT_MAX_EXHAUSTIVE_PLAYERS: usize = 12;

/// The largest roster for which exhaustive enumeration may be configured; (n-1)!! grows too fast
/// past this point for interactive use.
pub const EXHAUSTIVE_PLAYERS_CEILING: usize = 14;

pub const DEFAULT_STALE_AFTER_HOURS: f64 = 24.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring_bounds: ProbabilityBounds,
    pub calibration_bounds: ProbabilityBounds,
    pub max_secondary_weight: f64,
    pub max_exhaustive_players: usize,
    pub search: SearchConfig,
    pub stale_after_hours: f64,
    pub known_aggregation: Aggregation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring_bounds: SCORING_BOUNDS,
            calibration_bounds: CALIBRATION_BOUNDS,
            max_secondary_weight: DEFAULT_MAX_SECONDARY_WEIGHT,
            max_exhaustive_players: DEFAULT_MAX_EXHAUSTIVE_PLAYERS,
            search: SearchConfig::default(),
            stale_after_hours: DEFAULT_STALE_AFTER_HOURS,
            known_aggregation: Aggregation::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.scoring_bounds.validate()?;
        self.calibration_bounds.validate()?;
        if !(0.0..=0.5).contains(&self.max_secondary_weight) {
            bail!("maximum secondary weight must be in the range [0, 0.5]");
        }
        if !(2..=EXHAUSTIVE_PLAYERS_CEILING).contains(&self.max_exhaustive_players) {
            bail!("maximum exhaustive players must be in the range 2..={EXHAUSTIVE_PLAYERS_CEILING}");
        }
        self.search.validate()?;
        if !self.stale_after_hours.is_finite() || self.stale_after_hours <= 0.0 {
            bail!("staleness threshold must be a positive number of hours");
        }
        Ok(())
    }

    pub fn scoring_blender(&self) -> Blender {
        Blender {
            bounds: self.scoring_bounds,
            max_secondary_weight: self.max_secondary_weight,
        }
    }

    pub fn calibration_blender(&self) -> Blender {
        Blender {
            bounds: self.calibration_bounds,
            max_secondary_weight: self.max_secondary_weight,
        }
    }
}
