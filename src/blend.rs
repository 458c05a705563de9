//! Fusion of a shrunk historical win rate with a point-differential-implied win probability.
//!
//! The secondary (point-differential) signal is admitted in proportion to the sample reliability
//! of the pair, damped when the two signals are historically uncorrelated and when they disagree
//! on the current estimate. Its weight never exceeds [Blender::max_secondary_weight], so the
//! historical estimate always retains at least an equal say.

use serde::{Deserialize, Serialize};

pub const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Clamp applied when evaluating the blender against holdout outcomes.
pub const CALIBRATION_BOUNDS: ProbabilityBounds = ProbabilityBounds {
    lower: 0.01,
    upper: 0.99,
};

/// Tighter clamp applied inside the optimiser's scoring path.
pub const SCORING_BOUNDS: ProbabilityBounds = ProbabilityBounds {
    lower: 0.05,
    upper: 0.95,
};

pub const DEFAULT_MAX_SECONDARY_WEIGHT: f64 = 0.5;

/// Share of the weight retained when the signal correlation is unknown or non-positive.
const UNCORRELATED_DAMPING: f64 = 0.25;

/// Absolute disagreement at which the secondary signal is ignored entirely.
const MAX_DISAGREEMENT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityBounds {
    pub lower: f64,
    pub upper: f64,
}
impl ProbabilityBounds {
    /// Clamps `probability` into the bounds. Non-finite values resolve to [NEUTRAL_PROBABILITY].
    pub fn clamp(&self, probability: f64) -> f64 {
        if probability.is_finite() {
            probability.clamp(self.lower, self.upper)
        } else {
            NEUTRAL_PROBABILITY
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(0.0..NEUTRAL_PROBABILITY).contains(&self.lower)
            || !(NEUTRAL_PROBABILITY..=1.0).contains(&self.upper)
            || self.upper <= NEUTRAL_PROBABILITY
        {
            anyhow::bail!(
                "probability bounds [{}, {}] must satisfy 0 ≤ lower < 0.5 < upper ≤ 1",
                self.lower,
                self.upper
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blender {
    pub bounds: ProbabilityBounds,
    pub max_secondary_weight: f64,
}
impl Blender {
    pub fn calibration() -> Self {
        Self {
            bounds: CALIBRATION_BOUNDS,
            max_secondary_weight: DEFAULT_MAX_SECONDARY_WEIGHT,
        }
    }

    pub fn scoring() -> Self {
        Self {
            bounds: SCORING_BOUNDS,
            max_secondary_weight: DEFAULT_MAX_SECONDARY_WEIGHT,
        }
    }

    /// The weight given to `pd_win_prob` when blended with `base_win_rate`.
    pub fn secondary_weight(
        &self,
        base_win_rate: f64,
        pd_win_prob: f64,
        reliability: f64,
        signal_correlation: Option<f64>,
    ) -> f64 {
        let reliability = if reliability.is_finite() {
            reliability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let correlation_factor = match signal_correlation {
            Some(correlation) if correlation.is_finite() && correlation > 0.0 => {
                UNCORRELATED_DAMPING + (1.0 - UNCORRELATED_DAMPING) * correlation.min(1.0)
            }
            _ => UNCORRELATED_DAMPING,
        };
        let agreement = 1.0 - f64::min((base_win_rate - pd_win_prob).abs() / MAX_DISAGREEMENT, 1.0);
        self.max_secondary_weight * reliability * correlation_factor * agreement
    }

    /// Blends the two estimates. Without a point-differential signal, a valid `base_win_rate` is
    /// returned unchanged; otherwise the output lies within [Self::bounds].
    pub fn blend(
        &self,
        base_win_rate: f64,
        pd_win_prob: Option<f64>,
        reliability: f64,
        signal_correlation: Option<f64>,
    ) -> f64 {
        let base_win_rate = if base_win_rate.is_finite() {
            base_win_rate
        } else {
            NEUTRAL_PROBABILITY
        };
        let Some(pd_win_prob) = pd_win_prob else {
            return if (0.0..=1.0).contains(&base_win_rate) {
                base_win_rate
            } else {
                self.bounds.clamp(base_win_rate)
            };
        };
        if !pd_win_prob.is_finite() {
            return self.bounds.clamp(base_win_rate);
        }
        let base_win_rate = base_win_rate.clamp(0.0, 1.0);
        let pd_win_prob = pd_win_prob.clamp(0.0, 1.0);
        let weight = self.secondary_weight(base_win_rate, pd_win_prob, reliability, signal_correlation);
        self.bounds.clamp((1.0 - weight) * base_win_rate + weight * pd_win_prob)
    }
}

/// Blends with the calibration clamp. Pure, so it may be evaluated offline against holdout data.
pub fn blend(
    base_win_rate: f64,
    pd_win_prob: Option<f64>,
    reliability: f64,
    signal_correlation: Option<f64>,
) -> f64 {
    Blender::calibration().blend(base_win_rate, pd_win_prob, reliability, signal_correlation)
}
