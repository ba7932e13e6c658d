use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::baseline::Baseline;
use crate::detection::Severity;
use crate::types::Transaction;

// ============================================================
// Request types
// ============================================================

#[derive(Debug, Deserialize)]
pub struct CheckAnomalyRequest {
    pub wallet_address: String,
    pub user_id: String,
    pub transaction: Transaction,
}

#[derive(Debug, Deserialize)]
pub struct ComputeBaselineRequest {
    pub user_id: String,
}

// ============================================================
// Response types
// ============================================================

#[derive(Debug, Serialize)]
pub struct CheckAnomalyResponse {
    pub score: f64,
    pub is_anomaly: bool,
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct ComputeBaselineResponse {
    pub success: bool,
    pub baseline: BaselineSummary,
}

#[derive(Debug, Serialize)]
pub struct BaselineSummary {
    pub wallet_address: String,
    pub avg_amount: f64,
    pub max_amount: f64,
    pub min_amount: f64,
    pub total_tx_count: u32,
    pub hourly_pattern: HashMap<u8, u32>,
    pub computed_at: i64,
}

impl From<Baseline> for BaselineSummary {
    fn from(baseline: Baseline) -> Self {
        Self {
            wallet_address: baseline.wallet_address,
            avg_amount: baseline.avg_amount,
            max_amount: baseline.max_amount,
            min_amount: baseline.min_amount,
            total_tx_count: baseline.total_tx_count,
            hourly_pattern: baseline.hourly_pattern,
            computed_at: baseline.computed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub threshold: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
