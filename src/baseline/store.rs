use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::calculator::Baseline;

/// Generic TTL key-value store. The production deployment points this at a
/// shared cache; tests and single-node deployments use the in-memory one.
#[async_trait]
pub trait TtlCache: Send + Sync {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> eyre::Result<()>;
    async fn get(&self, key: &str) -> eyre::Result<Option<String>>;
}

/// In-process TTL cache backed by a HashMap. Entries past their deadline
/// behave exactly like entries that were never written.
#[derive(Default)]
pub struct MemoryTtlCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryTtlCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TtlCache for MemoryTtlCache {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> eyre::Result<()> {
        let deadline = Instant::now() + ttl;
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (value, deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> eyre::Result<Option<String>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, deadline)) if Instant::now() < *deadline => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

/// Adapter between the detection pipeline and the TTL cache: owns the key
/// scheme, the serialization format, and the expiry window for baselines.
pub struct BaselineStore {
    cache: Arc<dyn TtlCache>,
    ttl: Duration,
}

impl BaselineStore {
    pub fn new(cache: Arc<dyn TtlCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn cache_key(wallet_address: &str) -> String {
        format!("baseline:{wallet_address}")
    }

    /// Store a baseline, unconditionally replacing any previous one for
    /// the same wallet.
    pub async fn put(&self, baseline: &Baseline) -> eyre::Result<()> {
        let key = Self::cache_key(&baseline.wallet_address);
        let payload = serde_json::to_string(baseline)?;
        self.cache.set(&key, payload, self.ttl).await?;
        tracing::debug!(wallet = %baseline.wallet_address, "Baseline cached");
        Ok(())
    }

    /// Fetch the stored baseline for a wallet. Missing and expired entries
    /// both come back as None; a corrupt entry is logged and treated as
    /// missing so the caller falls through to recomputation.
    pub async fn get(&self, wallet_address: &str) -> eyre::Result<Option<Baseline>> {
        let key = Self::cache_key(wallet_address);
        let Some(payload) = self.cache.get(&key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Baseline>(&payload) {
            Ok(baseline) => Ok(Some(baseline)),
            Err(e) => {
                tracing::warn!(wallet = %wallet_address, error = %e, "Discarding unreadable cached baseline");
                Ok(None)
            }
        }
    }
}
