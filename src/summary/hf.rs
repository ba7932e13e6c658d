use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SummarizerConfig;
use crate::types::Transaction;

use super::{ModelError, TextSummarizer};

/// Client for a Hugging Face style text-generation endpoint.
/// Every request is bounded by the configured timeout; a timeout is just
/// another request failure as far as the caller is concerned.
pub struct HfSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
    max_new_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct Completion {
    generated_text: String,
}

impl HfSummarizer {
    pub fn new(config: &SummarizerConfig, api_token: String) -> eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_token,
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl TextSummarizer for HfSummarizer {
    async fn summarize(&self, tx: &Transaction, score: f64) -> Result<String, ModelError> {
        let prompt = build_prompt(tx, score);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({
                "inputs": prompt,
                "parameters": {
                    "max_new_tokens": self.max_new_tokens,
                    "temperature": self.temperature,
                    "return_full_text": false,
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::Status(status));
        }

        let completions: Vec<Completion> = response.json().await?;
        let text = completions
            .first()
            .map(|c| c.generated_text.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(ModelError::EmptyCompletion);
        }
        Ok(text)
    }
}

fn build_prompt(tx: &Transaction, score: f64) -> String {
    format!(
        "A cryptocurrency wallet {} transaction of {} at {} was flagged with anomaly score {}. \
         In about 50 words, explain to the wallet owner why this transaction looks unusual \
         and what they should check.",
        tx.direction.as_str(),
        tx.amount,
        tx.timestamp.to_rfc3339(),
        score
    )
}
