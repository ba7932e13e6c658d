use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use walletwatch_detector::alerts::PgAlertSink;
use walletwatch_detector::api::{self, AppState};
use walletwatch_detector::baseline::{BaselineStore, MemoryTtlCache};
use walletwatch_detector::config::Config;
use walletwatch_detector::history::FixtureTransactionSource;
use walletwatch_detector::service::AnomalyService;
use walletwatch_detector::summary::{HfSummarizer, SummaryGenerator, TextSummarizer};
use walletwatch_detector::users::PgUserDirectory;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=info for output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    tracing::info!("WalletWatch Detector starting");

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    tracing::info!(
        threshold = config.detection.threshold,
        "Configuration loaded from {}",
        config_path
    );

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| eyre::eyre!("Failed to connect to database: {}", e))?;

    tracing::info!("Connected to PostgreSQL");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| eyre::eyre!("Failed to run migrations: {}", e))?;

    tracing::info!("Database migrations complete");

    // Wire up the detection pipeline. The text model is optional: without a
    // credential every summary comes from the deterministic template.
    let baselines = BaselineStore::new(
        Arc::new(MemoryTtlCache::new()),
        Duration::from_secs(config.detection.baseline_ttl_secs),
    );

    let summarizer: Option<Arc<dyn TextSummarizer>> =
        match (config.summarizer.enabled, config.summarizer.api_token.clone()) {
            (true, Some(token)) => {
                tracing::info!(endpoint = %config.summarizer.endpoint, "Text summarizer enabled");
                Some(Arc::new(HfSummarizer::new(&config.summarizer, token)?))
            }
            _ => {
                tracing::info!("Text summarizer disabled, using template summaries");
                None
            }
        };

    let service = AnomalyService::new(
        &config.detection,
        baselines,
        Arc::new(FixtureTransactionSource::new()),
        Arc::new(PgUserDirectory::new(pool.clone())),
        Arc::new(PgAlertSink::new(pool.clone())),
        SummaryGenerator::new(summarizer),
    );

    let state = Arc::new(AppState {
        service,
        threshold: config.detection.threshold,
    });

    let shutdown = CancellationToken::new();

    let server = {
        let state = state.clone();
        let host = config.api.host.clone();
        let port = config.api.port;
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = api::serve(state, &host, port, shutdown).await {
                tracing::error!(error = %e, "API server failed");
            }
        })
    };

    tracing::info!("Detector running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping");
    shutdown.cancel();
    let _ = server.await;

    tracing::info!("WalletWatch Detector stopped gracefully");
    Ok(())
}
