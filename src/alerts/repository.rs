use async_trait::async_trait;
use sqlx::PgPool;

use super::{AlertSink, NewAlert};

/// Alert store backed by the shared PostgreSQL instance.
pub struct PgAlertSink {
    pool: PgPool,
}

impl PgAlertSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertSink for PgAlertSink {
    async fn insert_alert(&self, alert: &NewAlert) -> eyre::Result<()> {
        sqlx::query(
            "INSERT INTO alerts (user_id, target_id, severity, source_channel, message_text, is_read, is_blocked)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&alert.user_id)
        .bind(&alert.target_id)
        .bind(alert.severity.as_str())
        .bind(&alert.source_channel)
        .bind(&alert.message_text)
        .bind(alert.is_read)
        .bind(alert.is_blocked)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
