//! Utilities for working with probabilities and weighted samples.

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn mean(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);
    fn weighted_mean(&self, weights: &[f64]) -> f64;
    fn weighted_stdev(&self, weights: &[f64], mean: f64) -> f64;
    fn stdev(&self) -> f64;
    fn quantile(&self, q: f64) -> f64;
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Arithmetic mean; zero for an empty slice.
    fn mean(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.sum() / self.len() as f64
        }
    }

    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        self.scale(target / sum);
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }

    fn weighted_mean(&self, weights: &[f64]) -> f64 {
        debug_assert_eq!(
            self.len(),
            weights.len(),
            "number of weights {} does not match number of values {}",
            weights.len(),
            self.len()
        );
        self.iter().zip(weights).map(|(value, weight)| value * weight).sum()
    }

    fn weighted_stdev(&self, weights: &[f64], mean: f64) -> f64 {
        debug_assert_eq!(
            self.len(),
            weights.len(),
            "number of weights {} does not match number of values {}",
            weights.len(),
            self.len()
        );
        let variance: f64 = self
            .iter()
            .zip(weights)
            .map(|(value, weight)| weight * (value - mean).powi(2))
            .sum();
        variance.max(0.0).sqrt()
    }

    /// Population standard deviation; zero for an empty slice.
    fn stdev(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / self.len() as f64;
        variance.sqrt()
    }

    /// Nearest-rank quantile of a sorted copy: the value at rank `⌈q·n⌉`, clamped to the
    /// bounds of the sample. Zero for an empty slice.
    fn quantile(&self, q: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let mut sorted = self.to_vec();
        sorted.sort_by(f64::total_cmp);
        let rank = (q * sorted.len() as f64).ceil() as usize;
        sorted[rank.clamp(1, sorted.len()) - 1]
    }
}

/// Normalises scenario `weights` to sum to 1. Negative and non-finite weights are treated as
/// zero; if nothing positive remains, every weight becomes equal. Weights are divided by the
/// largest first, so the sum stays finite however large they are.
pub fn normalise_weights(weights: &mut [f64]) {
    for weight in &mut *weights {
        if !weight.is_finite() || *weight < 0.0 {
            *weight = 0.0;
        }
    }
    let max = weights.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        for weight in &mut *weights {
            *weight /= max;
        }
        weights.normalise(1.0);
    } else if !weights.is_empty() {
        weights.fill(1.0 / weights.len() as f64);
    }
}
