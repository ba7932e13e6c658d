use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::alerts::{AlertSink, NewAlert};
use crate::baseline::{calculator, Baseline, BaselineStore};
use crate::config::DetectionConfig;
use crate::detection::{AnomalyScorer, Comparison, Severity};
use crate::history::TransactionSource;
use crate::summary::SummaryGenerator;
use crate::types::Transaction;
use crate::users::UserDirectory;

/// Message returned for a transaction that was checked and found ordinary.
pub const NORMAL_MESSAGE: &str = "Transaction appears normal.";

/// Failure categories that cross the service boundary. Model failures never
/// appear here; the summary generator resolves those internally.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("user is not entitled to AI features")]
    Unauthorized,
    #[error("invalid request: {0}")]
    InvalidInput(String),
    #[error("insufficient transaction history")]
    InsufficientHistory,
    #[error("no baseline stored for this wallet")]
    NotFound,
    #[error(transparent)]
    Infrastructure(#[from] eyre::Report),
}

/// Outcome of one anomaly check as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyCheck {
    pub score: f64,
    pub is_anomaly: bool,
    pub threshold: f64,
    pub severity: Option<Severity>,
    pub summary: String,
}

/// One wallet/user pair for a periodic scan pass.
#[derive(Debug, Clone)]
pub struct ScanTarget {
    pub wallet_address: String,
    pub user_id: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    pub targets: usize,
    pub checked: usize,
    pub anomalies: usize,
    pub failures: usize,
}

/// Request-scoped anomaly detection pipeline. Holds no per-request state;
/// every collaborator is injected so the composition root (or a test)
/// decides what is real and what is in-memory.
pub struct AnomalyService {
    scorer: AnomalyScorer,
    baselines: BaselineStore,
    history: Arc<dyn TransactionSource>,
    users: Arc<dyn UserDirectory>,
    alerts: Arc<dyn AlertSink>,
    summaries: SummaryGenerator,
    history_window: usize,
}

impl AnomalyService {
    pub fn new(
        detection: &DetectionConfig,
        baselines: BaselineStore,
        history: Arc<dyn TransactionSource>,
        users: Arc<dyn UserDirectory>,
        alerts: Arc<dyn AlertSink>,
        summaries: SummaryGenerator,
    ) -> Self {
        Self {
            scorer: AnomalyScorer::new(detection),
            baselines,
            history,
            users,
            alerts,
            summaries,
            history_window: detection.history_window,
        }
    }

    /// Score one candidate transaction for a wallet. Steps run strictly in
    /// order: entitlement, baseline retrieval (falling back to a raw recent
    /// sample), scoring, then severity/summary/alert only for a confirmed
    /// anomaly. A normal transaction produces no writes at all.
    pub async fn check_anomaly(
        &self,
        wallet_address: &str,
        transaction: &Transaction,
        user_id: &str,
    ) -> Result<AnomalyCheck, DetectError> {
        validate_wallet(wallet_address)?;
        validate_user(user_id)?;
        self.ensure_entitled(user_id).await?;

        // A cache failure means "no baseline available", not a dead request;
        // it is logged so operators can tell it apart from a plain miss.
        let baseline = match self.baselines.get(wallet_address).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(wallet = %wallet_address, error = %e, "Baseline cache unreachable, falling back to raw sample");
                None
            }
        };

        let result = match &baseline {
            Some(baseline) => self.scorer.score(transaction, Comparison::Baseline(baseline)),
            None => {
                let sample = self
                    .history
                    .recent_transactions(wallet_address, self.history_window)
                    .await?;
                self.scorer.score(transaction, Comparison::Sample(&sample))
            }
        };

        if !result.is_anomaly {
            return Ok(AnomalyCheck {
                score: result.score,
                is_anomaly: false,
                threshold: result.threshold,
                severity: None,
                summary: NORMAL_MESSAGE.to_string(),
            });
        }

        let severity = Severity::from_score(result.score);
        let summary = self.summaries.generate(transaction, result.score).await;

        let alert = NewAlert::ai_anomaly(user_id, wallet_address, severity, summary.clone());
        self.alerts.insert_alert(&alert).await?;

        tracing::warn!(
            wallet = %wallet_address,
            user = %user_id,
            score = result.score,
            severity = severity.as_str(),
            "ANOMALY DETECTED"
        );

        Ok(AnomalyCheck {
            score: result.score,
            is_anomaly: true,
            threshold: result.threshold,
            severity: Some(severity),
            summary,
        })
    }

    /// Recompute and cache a wallet's baseline from its recent history.
    pub async fn compute_baseline(
        &self,
        wallet_address: &str,
        user_id: &str,
    ) -> Result<Baseline, DetectError> {
        validate_wallet(wallet_address)?;
        validate_user(user_id)?;
        self.ensure_entitled(user_id).await?;

        let sample = self
            .history
            .recent_transactions(wallet_address, self.history_window)
            .await?;

        let baseline = calculator::compute(wallet_address, &sample)
            .ok_or(DetectError::InsufficientHistory)?;

        self.baselines.put(&baseline).await?;
        tracing::info!(
            wallet = %wallet_address,
            tx_count = baseline.total_tx_count,
            "Baseline computed"
        );
        Ok(baseline)
    }

    /// Fetch the cached baseline for a wallet.
    pub async fn get_baseline(&self, wallet_address: &str) -> Result<Baseline, DetectError> {
        validate_wallet(wallet_address)?;
        self.baselines
            .get(wallet_address)
            .await?
            .ok_or(DetectError::NotFound)
    }

    /// Run the full check once per target, using each wallet's freshest
    /// transaction as the candidate. Targets are independent: one failing
    /// never stops the rest.
    pub async fn scan(&self, targets: &[ScanTarget]) -> ScanReport {
        let mut report = ScanReport {
            targets: targets.len(),
            ..ScanReport::default()
        };

        for target in targets {
            let candidate = match self
                .history
                .recent_transactions(&target.wallet_address, 1)
                .await
            {
                Ok(txs) => txs.into_iter().next(),
                Err(e) => {
                    tracing::error!(wallet = %target.wallet_address, error = %e, "Scan target skipped: history fetch failed");
                    report.failures += 1;
                    continue;
                }
            };
            let Some(candidate) = candidate else {
                tracing::debug!(wallet = %target.wallet_address, "Scan target skipped: no transactions");
                continue;
            };

            match self
                .check_anomaly(&target.wallet_address, &candidate, &target.user_id)
                .await
            {
                Ok(check) => {
                    report.checked += 1;
                    if check.is_anomaly {
                        report.anomalies += 1;
                    }
                }
                Err(e) => {
                    tracing::error!(wallet = %target.wallet_address, error = %e, "Scan target failed");
                    report.failures += 1;
                }
            }
        }

        report
    }

    async fn ensure_entitled(&self, user_id: &str) -> Result<(), DetectError> {
        let user = self.users.get_user(user_id).await?;
        match user {
            Some(profile) if profile.ai_enabled => Ok(()),
            _ => Err(DetectError::Unauthorized),
        }
    }
}

fn validate_wallet(wallet_address: &str) -> Result<(), DetectError> {
    if wallet_address.trim().is_empty() {
        return Err(DetectError::InvalidInput("wallet address is required".to_string()));
    }
    Ok(())
}

fn validate_user(user_id: &str) -> Result<(), DetectError> {
    if user_id.trim().is_empty() {
        return Err(DetectError::InvalidInput("user id is required".to_string()));
    }
    Ok(())
}
