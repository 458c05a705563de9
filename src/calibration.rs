//! Offline evaluation of the signal blender against holdout outcomes.

use serde::{Deserialize, Serialize};

use crate::blend::{Blender, ProbabilityBounds};
use crate::probs::SliceExt;

/// One historical game: the signals available beforehand and whether our pair won.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutRow {
    pub win_rate_shrunk: f64,
    #[serde(default)]
    pub pd_win_probability: Option<f64>,
    #[serde(default)]
    pub reliability: f64,
    #[serde(default)]
    pub signal_correlation: Option<f64>,
    pub won: bool,
}

/// Mean squared error of `predictions` against binary `outcomes`; `None` when there is nothing
/// to score or the lengths differ.
pub fn brier_score(predictions: &[f64], outcomes: &[bool]) -> Option<f64> {
    if predictions.is_empty() || predictions.len() != outcomes.len() {
        return None;
    }
    let errors: Vec<_> = predictions
        .iter()
        .zip(outcomes)
        .map(|(&prediction, &won)| (prediction - indicator(won)).powi(2))
        .collect();
    Some(errors.mean())
}

/// Mean negative log-likelihood, with predictions clamped into `bounds` so that certain-but-wrong
/// predictions stay finite.
pub fn log_loss(predictions: &[f64], outcomes: &[bool], bounds: &ProbabilityBounds) -> Option<f64> {
    if predictions.is_empty() || predictions.len() != outcomes.len() {
        return None;
    }
    let losses: Vec<_> = predictions
        .iter()
        .zip(outcomes)
        .map(|(&prediction, &won)| {
            let prediction = bounds.clamp(prediction);
            if won {
                -prediction.ln()
            } else {
                -(1.0 - prediction).ln()
            }
        })
        .collect();
    Some(losses.mean())
}

fn indicator(won: bool) -> f64 {
    if won {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub brier_score: f64,
    pub log_loss: f64,
}
impl Metrics {
    fn evaluate(predictions: &[f64], outcomes: &[bool], bounds: &ProbabilityBounds) -> Option<Self> {
        Some(Self {
            brier_score: brier_score(predictions, outcomes)?,
            log_loss: log_loss(predictions, outcomes, bounds)?,
        })
    }
}

/// Compares the shrunk win rate on its own against the blended estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationReport {
    pub rows: usize,
    /// Rows that carried a point-differential signal.
    pub with_secondary: usize,
    pub base: Metrics,
    pub blended: Metrics,
}
impl CalibrationReport {
    /// `None` when there are no rows.
    pub fn evaluate(rows: &[HoldoutRow], blender: &Blender) -> Option<Self> {
        let outcomes: Vec<_> = rows.iter().map(|row| row.won).collect();
        let base: Vec<_> = rows
            .iter()
            .map(|row| blender.bounds.clamp(row.win_rate_shrunk))
            .collect();
        let blended: Vec<_> = rows
            .iter()
            .map(|row| {
                blender.bounds.clamp(blender.blend(
                    row.win_rate_shrunk,
                    row.pd_win_probability,
                    row.reliability,
                    row.signal_correlation,
                ))
            })
            .collect();
        Some(Self {
            rows: rows.len(),
            with_secondary: rows.iter().filter(|row| row.pd_win_probability.is_some()).count(),
            base: Metrics::evaluate(&base, &outcomes, &blender.bounds)?,
            blended: Metrics::evaluate(&blended, &outcomes, &blender.bounds)?,
        })
    }

    /// Reduction in Brier score achieved by blending; positive is better.
    pub fn brier_improvement(&self) -> f64 {
        self.base.brier_score - self.blended.brier_score
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;
    use crate::blend::CALIBRATION_BOUNDS;

    fn row(win_rate_shrunk: f64, pd_win_probability: Option<f64>, won: bool) -> HoldoutRow {
        HoldoutRow {
            win_rate_shrunk,
            pd_win_probability,
            reliability: 1.0,
            signal_correlation: Some(1.0),
            won,
        }
    }

    #[test]
    fn brier() {
        assert_float_absolute_eq!(0.0, brier_score(&[1.0, 0.0], &[true, false]).unwrap(), 1e-12);
        assert_float_absolute_eq!(0.25, brier_score(&[0.5, 0.5], &[true, false]).unwrap(), 1e-12);
        assert_float_absolute_eq!(0.1, brier_score(&[0.8, 0.4], &[true, false]).unwrap(), 1e-12);
        assert_eq!(None, brier_score(&[], &[]));
        assert_eq!(None, brier_score(&[0.5], &[true, false]));
    }

    #[test]
    fn log_loss_clamps() {
        let loss = log_loss(&[0.5, 0.5], &[true, false], &CALIBRATION_BOUNDS).unwrap();
        assert_float_absolute_eq!(std::f64::consts::LN_2, loss, 1e-12);

        let loss = log_loss(&[0.0], &[true], &CALIBRATION_BOUNDS).unwrap();
        assert_float_absolute_eq!(-(0.01f64.ln()), loss, 1e-12);
        assert!(loss.is_finite());
        assert_eq!(None, log_loss(&[], &[], &CALIBRATION_BOUNDS));
    }

    #[test]
    fn report() {
        let rows = [
            row(0.6, Some(0.7), true),
            row(0.6, None, false),
            row(0.4, Some(0.3), false),
        ];
        let report = CalibrationReport::evaluate(&rows, &Blender::calibration()).unwrap();
        assert_eq!(3, report.rows);
        assert_eq!(2, report.with_secondary);
        // blended: 0.64, 0.6, 0.36
        let expected_base = (0.16 + 0.36 + 0.16) / 3.0;
        let expected_blended = (0.36f64.powi(2) + 0.36 + 0.36f64.powi(2)) / 3.0;
        assert_float_absolute_eq!(expected_base, report.base.brier_score, 1e-9);
        assert_float_absolute_eq!(expected_blended, report.blended.brier_score, 1e-9);
        assert!(report.brier_improvement() > 0.0);
        assert!(report.blended.log_loss < report.base.log_loss);
    }

    #[test]
    fn report_empty() {
        assert_eq!(None, CalibrationReport::evaluate(&[], &Blender::calibration()));
    }

    #[test]
    fn deserialize_row() {
        let row: HoldoutRow = serde_json::from_str(r#"{"win_rate_shrunk": 0.55, "won": true}"#).unwrap();
        assert_eq!(0.55, row.win_rate_shrunk);
        assert_eq!(None, row.pd_win_probability);
        assert_eq!(0.0, row.reliability);
        assert!(row.won);
    }
}
