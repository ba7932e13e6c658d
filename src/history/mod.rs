use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::types::{Transaction, TxDirection};

/// Source of a wallet's recent transaction history, newest first.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn recent_transactions(
        &self,
        wallet_address: &str,
        limit: usize,
    ) -> eyre::Result<Vec<Transaction>>;
}

/// Synthetic history derived deterministically from the wallet address.
/// Stands in for real chain ingestion so the full pipeline runs end-to-end;
/// the same wallet always produces the same amounts.
pub struct FixtureTransactionSource;

impl FixtureTransactionSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FixtureTransactionSource {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a over the address bytes. Nearby addresses land on unrelated
/// histories.
fn seed_for(wallet_address: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in wallet_address.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl TransactionSource for FixtureTransactionSource {
    async fn recent_transactions(
        &self,
        wallet_address: &str,
        limit: usize,
    ) -> eyre::Result<Vec<Transaction>> {
        let seed = seed_for(wallet_address);
        let count = limit.min(12);
        let now = Utc::now();

        let mut transactions = Vec::with_capacity(count);
        for i in 0..count {
            let step = seed.rotate_left(i as u32 * 7) % 1000;
            // Amounts cluster in a plausible 0.01..1.01 band per wallet.
            let amount = 0.01 + (step as f64) / 1000.0;
            let direction = if step % 2 == 0 {
                TxDirection::Receive
            } else {
                TxDirection::Send
            };
            transactions.push(Transaction {
                amount,
                timestamp: now - Duration::hours(3 * i as i64 + 1),
                direction,
            });
        }

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_wallet_same_amounts() {
        let source = FixtureTransactionSource::new();
        let first = source.recent_transactions("0xABC", 10).await.unwrap();
        let second = source.recent_transactions("0xABC", 10).await.unwrap();
        let amounts: Vec<f64> = first.iter().map(|tx| tx.amount).collect();
        let again: Vec<f64> = second.iter().map(|tx| tx.amount).collect();
        assert_eq!(amounts, again);
        assert_eq!(first.len(), 10);
    }

    #[tokio::test]
    async fn different_wallets_diverge() {
        let source = FixtureTransactionSource::new();
        let a = source.recent_transactions("0xAAA", 10).await.unwrap();
        let b = source.recent_transactions("0xBBB", 10).await.unwrap();
        let a_amounts: Vec<f64> = a.iter().map(|tx| tx.amount).collect();
        let b_amounts: Vec<f64> = b.iter().map(|tx| tx.amount).collect();
        assert_ne!(a_amounts, b_amounts);
    }

    #[tokio::test]
    async fn limit_is_respected() {
        let source = FixtureTransactionSource::new();
        let txs = source.recent_transactions("0xABC", 3).await.unwrap();
        assert_eq!(txs.len(), 3);
    }

    #[tokio::test]
    async fn amounts_are_positive_and_ordered_newest_first() {
        let source = FixtureTransactionSource::new();
        let txs = source.recent_transactions("0xABC", 8).await.unwrap();
        for tx in &txs {
            assert!(tx.amount > 0.0);
        }
        for pair in txs.windows(2) {
            assert!(pair[0].timestamp > pair[1].timestamp);
        }
    }
}
