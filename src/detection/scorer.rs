use serde::Serialize;

use crate::baseline::Baseline;
use crate::config::DetectionConfig;
use crate::types::{sanitize_amount, Transaction};

/// Fixed scaling constant converting relative deviation into the scoring
/// scale. A deviation of 100% from the mean lands at 10.0.
const SCORE_SCALE: f64 = 10.0;

/// What a candidate transaction is compared against: a cached baseline,
/// or a raw sample of recent transactions when no baseline exists.
pub enum Comparison<'a> {
    Baseline(&'a Baseline),
    Sample(&'a [Transaction]),
}

/// Outcome of scoring one candidate transaction. Computed fresh per request
/// and never persisted.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AnomalyResult {
    pub score: f64,
    pub is_anomaly: bool,
    pub threshold: f64,
}

/// Scores candidate transactions against a wallet's typical behavior.
/// Pure: identical inputs and threshold always produce identical output.
pub struct AnomalyScorer {
    threshold: f64,
    min_sample: usize,
}

impl AnomalyScorer {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            threshold: config.threshold,
            min_sample: config.min_sample,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score a candidate against its comparison set. A raw sample below the
    /// minimum size means insufficient data, which is defined as not
    /// anomalous rather than as an error.
    pub fn score(&self, candidate: &Transaction, comparison: Comparison<'_>) -> AnomalyResult {
        let avg = match comparison {
            Comparison::Baseline(baseline) => sanitize_amount(baseline.avg_amount),
            Comparison::Sample(sample) => {
                if sample.len() < self.min_sample {
                    return self.not_anomalous();
                }
                let total: f64 = sample.iter().map(|tx| sanitize_amount(tx.amount)).sum();
                total / sample.len() as f64
            }
        };

        let deviation = if avg > 0.0 {
            (sanitize_amount(candidate.amount) - avg).abs() / avg
        } else {
            0.0
        };

        let score = round2(deviation * SCORE_SCALE);
        AnomalyResult {
            score,
            is_anomaly: score > self.threshold,
            threshold: self.threshold,
        }
    }

    fn not_anomalous(&self) -> AnomalyResult {
        AnomalyResult {
            score: 0.0,
            is_anomaly: false,
            threshold: self.threshold,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
