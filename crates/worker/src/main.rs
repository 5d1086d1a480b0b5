//! `lightwatch-worker` -- periodic alert rule evaluation.
//!
//! Evaluates every enabled alert rule against recent metric samples on a
//! fixed interval, records an event for each breach, and posts webhook
//! notifications for rules that configure an endpoint.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                              |
//! |-------------------------|----------|---------|------------------------------------------|
//! | `DATABASE_URL`          | yes      | --      | PostgreSQL connection string             |
//! | `EVAL_INTERVAL_SECS`    | no       | `30`    | Seconds between evaluation passes        |
//! | `NOTIFY_QUEUE_CAPACITY` | no       | `256`   | Pending webhooks before new ones drop    |
//! | `NOTIFY_MAX_IN_FLIGHT`  | no       | `16`    | Concurrent webhook deliveries            |
//! | `SHUTDOWN_TIMEOUT_SECS` | no       | `10`    | Time allowed to drain webhooks on exit   |
//! | `RULE_SCOPE_SERVICE`    | no       | --      | Only evaluate rules for this service     |
//! | `RULES_SEED_FILE`       | no       | --      | JSON rule definitions to seed at startup |
//! | `LOG_FORMAT`            | no       | `text`  | `json` for JSON log lines                |
//! | `RUST_LOG`              | no       | --      | Overrides the default log filter         |

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use lightwatch_events::{NotificationDispatcher, WebhookDelivery};
use lightwatch_worker::config::{EngineConfig, LogFormat};
use lightwatch_worker::store::PgAlertStore;
use lightwatch_worker::{rule_seed, AlertEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "lightwatch_worker=info,lightwatch_events=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logging starts first so warnings about invalid settings are visible.
    init_tracing(LogFormat::from_env());
    let config = EngineConfig::from_env()?;

    tracing::info!(
        interval_secs = config.eval_interval.as_secs(),
        queue_capacity = config.dispatcher.queue_capacity,
        max_in_flight = config.dispatcher.max_in_flight,
        rule_scope = config.rule_scope_service.as_deref().unwrap_or("*"),
        "Starting lightwatch-worker"
    );

    // --- Database ---
    let pool = lightwatch_db::create_pool(&config.database_url)
        .await
        .context("failed to connect to database")?;
    lightwatch_db::health_check(&pool)
        .await
        .context("database health check failed")?;
    lightwatch_db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    tracing::info!("Database ready");

    if let Some(path) = &config.rules_seed_file {
        rule_seed::seed_from_file(&pool, Path::new(path))
            .await
            .context("failed to seed alert rules")?;
    }

    // --- Notifications ---
    let delivery = Arc::new(WebhookDelivery::new().context("failed to build webhook client")?);
    let (dispatcher, dispatcher_handle) =
        NotificationDispatcher::spawn(delivery, config.dispatcher);

    // --- Engine ---
    let store = Arc::new(PgAlertStore::new(pool.clone()));
    let engine = AlertEngine::new(store.clone(), store.clone(), store, Arc::new(dispatcher))
        .with_rule_scope(config.rule_scope_service.clone());
    let engine_handle = engine.start(config.eval_interval);

    shutdown_signal().await;

    // --- Shutdown ---
    // The engine owns the last dispatcher sender; stopping it lets the
    // dispatcher see the end of its queue.
    engine_handle.stop().await;
    tracing::info!("Alert engine stopped");

    if dispatcher_handle.drain(config.shutdown_timeout).await {
        tracing::info!("Notification queue drained");
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
