//! FollowTrace binary entry point

use followtrace::{AppState, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Initialize tracing/logging
/// 2. Initialize metrics
/// 3. Load configuration from file and environment
/// 4. Initialize AppState
/// 5. Run the reconciliation worker (once, or on an interval)
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize tracing/logging
    let log_format =
        std::env::var("FOLLOWTRACE__LOGGING__FORMAT").unwrap_or_else(|_| "pretty".to_string());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "followtrace=info".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "followtrace=info".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    tracing::info!("Starting FollowTrace...");

    // 2. Initialize metrics
    followtrace::metrics::init_metrics();

    // 3. Load configuration
    let config = config::AppConfig::load()?;
    tracing::info!(
        database = %config.database.path.display(),
        upstream = %config.upstream.base_url,
        "Configuration loaded"
    );

    // 4. Initialize application state
    let state = AppState::new(config.clone()).await?;
    let reconciler = state.reconciler();

    // 5. Run the worker
    if config.worker.run_once {
        let summary = reconciler.run().await?;
        if summary.failed > 0 {
            return Err(format!(
                "{} of {} accounts failed to reconcile, see logs for details",
                summary.failed,
                summary.processed + summary.failed
            )
            .into());
        }
        return Ok(());
    }

    let interval_secs = config.worker.interval_seconds.max(1);
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    tracing::info!(interval_seconds = interval_secs, "Worker loop started");

    loop {
        interval.tick().await;

        tracing::info!("Running scheduled reconciliation...");
        match reconciler.run().await {
            Ok(summary) => {
                tracing::info!(
                    processed = summary.processed,
                    failed = summary.failed,
                    "Scheduled reconciliation completed"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled reconciliation failed");
            }
        }
    }
}
