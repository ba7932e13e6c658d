use serde::{Deserialize, Serialize};

/// Discrete severity tier for a persisted alert.
///
/// `Low` exists because the alert store carries manually-curated alerts from
/// other channels that use it; the score classifier itself never assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classify a confirmed anomaly score. First match wins.
    pub fn from_score(score: f64) -> Self {
        if score > 5.0 {
            Self::Critical
        } else if score > 3.0 {
            Self::High
        } else {
            Self::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.rank().cmp(&other.rank()))
    }
}
