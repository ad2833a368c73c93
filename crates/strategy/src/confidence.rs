use rand::Rng;

use common::Pair;

use crate::config::ConfidenceConfig;

/// Produces the confidence attached to a candidate signal.
///
/// Confidence is a heuristic score, not a calibrated probability, and is
/// independent of the indicator values that decide the direction.
pub trait ConfidenceScorer: Send + Sync {
    /// Score in percent for a candidate on `pair`, already rounded to two decimals.
    fn score(&self, pair: &Pair) -> f64;
}

/// Uniform draw from `[min, max)`, floored to `min`, two-decimal precision.
#[derive(Debug, Clone, Copy)]
pub struct RandomConfidence {
    min: f64,
    max: f64,
}

impl RandomConfidence {
    pub fn new(min: f64, max: f64) -> Self {
        assert!(min < max, "confidence band must be non-empty");
        Self { min, max }
    }

    pub fn from_config(cfg: &ConfidenceConfig) -> Self {
        Self::new(cfg.min, cfg.max)
    }

    /// Draw using the supplied generator.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let raw: f64 = rng.gen_range(self.min..self.max);
        round2(raw.max(self.min))
    }
}

impl Default for RandomConfidence {
    fn default() -> Self {
        Self::from_config(&ConfidenceConfig::default())
    }
}

impl ConfidenceScorer for RandomConfidence {
    fn score(&self, _pair: &Pair) -> f64 {
        self.sample(&mut rand::thread_rng())
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
