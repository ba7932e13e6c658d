use chrono::{Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{sanitize_amount, Transaction};

/// Statistical summary of a wallet's recent transaction behavior.
/// Serves as the comparison point for anomaly scoring until it expires
/// from the cache and gets recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub wallet_address: String,
    pub avg_amount: f64,
    pub max_amount: f64,
    pub min_amount: f64,
    pub total_tx_count: u32,
    /// Transaction count per UTC hour of day. Hours with no activity are
    /// absent rather than stored as zero.
    pub hourly_pattern: HashMap<u8, u32>,
    pub computed_at: i64,
}

/// Build a baseline from a wallet's transaction history sample.
/// Returns None for an empty sample: no history means no baseline,
/// never a zeroed one.
pub fn compute(wallet_address: &str, sample: &[Transaction]) -> Option<Baseline> {
    if sample.is_empty() {
        return None;
    }

    let amounts: Vec<f64> = sample.iter().map(|tx| sanitize_amount(tx.amount)).collect();
    let total: f64 = amounts.iter().sum();
    let avg_amount = total / amounts.len() as f64;
    let max_amount = amounts.iter().copied().fold(amounts[0], f64::max);
    let min_amount = amounts.iter().copied().fold(amounts[0], f64::min);

    let mut hourly_pattern: HashMap<u8, u32> = HashMap::new();
    for tx in sample {
        *hourly_pattern.entry(tx.timestamp.hour() as u8).or_insert(0) += 1;
    }

    Some(Baseline {
        wallet_address: wallet_address.to_string(),
        avg_amount,
        max_amount,
        min_amount,
        total_tx_count: sample.len() as u32,
        hourly_pattern,
        computed_at: Utc::now().timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TxDirection;
    use chrono::{DateTime, Utc};

    fn tx(amount: f64, timestamp: &str) -> Transaction {
        Transaction {
            amount,
            timestamp: timestamp.parse::<DateTime<Utc>>().unwrap(),
            direction: TxDirection::Send,
        }
    }

    #[test]
    fn empty_sample_yields_no_baseline() {
        assert!(compute("0xABC", &[]).is_none());
    }

    #[test]
    fn computes_mean_and_extrema() {
        let sample = vec![
            tx(0.1, "2024-05-01T09:10:00Z"),
            tx(0.05, "2024-05-01T09:45:00Z"),
            tx(0.2, "2024-05-01T14:00:00Z"),
            tx(0.15, "2024-05-02T09:30:00Z"),
        ];
        let baseline = compute("0xABC", &sample).unwrap();
        assert_eq!(baseline.wallet_address, "0xABC");
        assert!((baseline.avg_amount - 0.125).abs() < 1e-12);
        assert_eq!(baseline.max_amount, 0.2);
        assert_eq!(baseline.min_amount, 0.05);
        assert_eq!(baseline.total_tx_count, 4);
    }

    #[test]
    fn hourly_pattern_skips_empty_hours() {
        let sample = vec![
            tx(1.0, "2024-05-01T09:10:00Z"),
            tx(1.0, "2024-05-01T09:45:00Z"),
            tx(1.0, "2024-05-01T14:00:00Z"),
        ];
        let baseline = compute("0xABC", &sample).unwrap();
        assert_eq!(baseline.hourly_pattern.len(), 2);
        assert_eq!(baseline.hourly_pattern[&9], 2);
        assert_eq!(baseline.hourly_pattern[&14], 1);
        assert!(!baseline.hourly_pattern.contains_key(&10));
    }

    #[test]
    fn invariants_hold() {
        let sample = vec![
            tx(3.0, "2024-05-01T01:00:00Z"),
            tx(7.0, "2024-05-01T02:00:00Z"),
            tx(5.0, "2024-05-01T03:00:00Z"),
        ];
        let baseline = compute("0xABC", &sample).unwrap();
        assert!(baseline.min_amount <= baseline.avg_amount);
        assert!(baseline.avg_amount <= baseline.max_amount);
        let hourly_total: u32 = baseline.hourly_pattern.values().sum();
        assert_eq!(hourly_total, baseline.total_tx_count);
    }

    #[test]
    fn negative_amounts_count_as_zero() {
        let sample = vec![
            tx(-5.0, "2024-05-01T01:00:00Z"),
            tx(2.0, "2024-05-01T02:00:00Z"),
        ];
        let baseline = compute("0xABC", &sample).unwrap();
        assert_eq!(baseline.min_amount, 0.0);
        assert_eq!(baseline.max_amount, 2.0);
        assert_eq!(baseline.avg_amount, 1.0);
    }

    #[test]
    fn single_transaction_baseline() {
        let sample = vec![tx(0.5, "2024-05-01T23:59:00Z")];
        let baseline = compute("0xABC", &sample).unwrap();
        assert_eq!(baseline.avg_amount, 0.5);
        assert_eq!(baseline.min_amount, 0.5);
        assert_eq!(baseline.max_amount, 0.5);
        assert_eq!(baseline.hourly_pattern[&23], 1);
    }

    #[test]
    fn baseline_roundtrips_through_json() {
        let sample = vec![
            tx(0.1, "2024-05-01T09:10:00Z"),
            tx(0.2, "2024-05-01T14:00:00Z"),
        ];
        let baseline = compute("0xABC", &sample).unwrap();
        let json = serde_json::to_string(&baseline).unwrap();
        let parsed: Baseline = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, baseline);
    }
}
