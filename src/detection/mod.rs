pub mod scorer;
pub mod severity;

pub use scorer::{AnomalyResult, AnomalyScorer, Comparison};
pub use severity::Severity;
