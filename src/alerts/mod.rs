pub mod repository;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;

use crate::detection::Severity;

pub use repository::PgAlertSink;

/// Source channel stamped on every alert this pipeline emits.
pub const AI_ANOMALY_CHANNEL: &str = "AI_ANOMALY";

/// An alert ready for insertion. Only ever constructed for a confirmed
/// anomaly; normal transactions produce no record at all.
#[derive(Debug, Clone, Serialize)]
pub struct NewAlert {
    pub user_id: String,
    pub target_id: String,
    pub severity: Severity,
    pub source_channel: String,
    pub message_text: String,
    pub is_read: bool,
    pub is_blocked: bool,
}

impl NewAlert {
    pub fn ai_anomaly(
        user_id: &str,
        target_id: &str,
        severity: Severity,
        message_text: String,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            target_id: target_id.to_string(),
            severity,
            source_channel: AI_ANOMALY_CHANNEL.to_string(),
            message_text,
            is_read: false,
            is_blocked: false,
        }
    }
}

/// External alert store. A failed write surfaces to the caller rather than
/// being swallowed.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn insert_alert(&self, alert: &NewAlert) -> eyre::Result<()>;
}

/// Collects alerts in memory. Used in tests and in deployments that ship
/// alerts out of process some other way.
#[derive(Default)]
pub struct MemoryAlertSink {
    alerts: Mutex<Vec<NewAlert>>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<NewAlert> {
        std::mem::take(&mut *self.alerts.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AlertSink for MemoryAlertSink {
    async fn insert_alert(&self, alert: &NewAlert) -> eyre::Result<()> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}
