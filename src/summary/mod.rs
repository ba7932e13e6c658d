pub mod hf;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::types::Transaction;

pub use hf::HfSummarizer;

/// External generative-text collaborator. Implementations produce a short
/// human-readable explanation of why a transaction was flagged.
#[async_trait]
pub trait TextSummarizer: Send + Sync {
    async fn summarize(&self, tx: &Transaction, score: f64) -> Result<String, ModelError>;
}

/// Ways the external model call can fail. None of these ever escape the
/// summary generator; they all collapse into the template summary.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("summarization request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("summarization endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("summarization endpoint returned empty text")]
    EmptyCompletion,
}

/// Produces the alert message text. Delegates to the configured model when
/// one exists and falls back to a deterministic template on any failure, so
/// callers always get some string back.
pub struct SummaryGenerator {
    model: Option<Arc<dyn TextSummarizer>>,
}

impl SummaryGenerator {
    pub fn new(model: Option<Arc<dyn TextSummarizer>>) -> Self {
        Self { model }
    }

    pub async fn generate(&self, tx: &Transaction, score: f64) -> String {
        let Some(model) = &self.model else {
            return template_summary(tx, score);
        };
        match model.summarize(tx, score).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Text model unavailable, using template summary");
                template_summary(tx, score)
            }
        }
    }
}

/// Deterministic fallback message used whenever the model is absent,
/// disabled, or fails.
pub fn template_summary(tx: &Transaction, score: f64) -> String {
    format!(
        "Anomaly detected: Transaction of {} shows unusual patterns (score: {})",
        tx.amount, score
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TxDirection;
    use chrono::{DateTime, Utc};

    fn tx(amount: f64) -> Transaction {
        Transaction {
            amount,
            timestamp: "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap(),
            direction: TxDirection::Send,
        }
    }

    struct FailingModel;

    #[async_trait]
    impl TextSummarizer for FailingModel {
        async fn summarize(&self, _tx: &Transaction, _score: f64) -> Result<String, ModelError> {
            Err(ModelError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
        }
    }

    struct EmptyModel;

    #[async_trait]
    impl TextSummarizer for EmptyModel {
        async fn summarize(&self, _tx: &Transaction, _score: f64) -> Result<String, ModelError> {
            Err(ModelError::EmptyCompletion)
        }
    }

    struct EchoModel;

    #[async_trait]
    impl TextSummarizer for EchoModel {
        async fn summarize(&self, tx: &Transaction, score: f64) -> Result<String, ModelError> {
            Ok(format!("model says {} scored {}", tx.amount, score))
        }
    }

    #[tokio::test]
    async fn no_model_uses_template() {
        let generator = SummaryGenerator::new(None);
        let summary = generator.generate(&tx(0.2), 6.0).await;
        assert_eq!(
            summary,
            "Anomaly detected: Transaction of 0.2 shows unusual patterns (score: 6)"
        );
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_template() {
        let generator = SummaryGenerator::new(Some(Arc::new(FailingModel)));
        let summary = generator.generate(&tx(1.5), 3.33).await;
        assert_eq!(
            summary,
            "Anomaly detected: Transaction of 1.5 shows unusual patterns (score: 3.33)"
        );
    }

    #[tokio::test]
    async fn empty_completion_falls_back_to_template() {
        let generator = SummaryGenerator::new(Some(Arc::new(EmptyModel)));
        let summary = generator.generate(&tx(0.5), 4.2).await;
        assert_eq!(
            summary,
            "Anomaly detected: Transaction of 0.5 shows unusual patterns (score: 4.2)"
        );
    }

    #[tokio::test]
    async fn successful_model_text_passes_through() {
        let generator = SummaryGenerator::new(Some(Arc::new(EchoModel)));
        let summary = generator.generate(&tx(0.2), 6.0).await;
        assert_eq!(summary, "model says 0.2 scored 6");
    }
}
