//! Coverage Matrix - country x industry editorial coverage service
//!
//! Serves the dashboard's filter catalog, coverage matrix and legend over a
//! Postgres content database.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use coverage_matrix::config::{print_env_help, ServerConfig};
use coverage_matrix::handlers::{build_router, CoverageState};
use coverage_matrix::store::PgCoverageStore;
use coverage_matrix::tracing_setup::{self, LogFormat};
use coverage_matrix::{metrics, middleware};

/// Upper bound on draining the connection pool at shutdown
const POOL_CLOSE_TIMEOUT_SECS: u64 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|a| a == "--help" || a == "-h") {
        print_env_help();
        return Ok(());
    }

    // Subscriber first so configuration warnings are not lost
    tracing_setup::init_tracing(LogFormat::from_env())?;
    let server_config = ServerConfig::from_env();

    metrics::register_metrics().context("Failed to register metrics")?;
    info!("Metrics registered at /metrics");

    info!("Starting coverage matrix server...");
    server_config.log();

    let store = Arc::new(PgCoverageStore::connect(&server_config.database)?);
    let pool = store.pool().clone();

    let state = Arc::new(CoverageState::new(store, server_config.clone()));

    let max_concurrent = server_config.max_concurrent_requests;
    info!(max_concurrent, "Concurrency limiting enabled");

    let app = build_router(state)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(TimeoutLayer::new(server_config.request_timeout()))
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(server_config.cors.to_layer());

    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Closing database pool...");
    match tokio::time::timeout(Duration::from_secs(POOL_CLOSE_TIMEOUT_SECS), pool.close()).await {
        Ok(()) => info!("Server shutdown complete"),
        Err(_) => tracing::error!(
            "Database pool close timed out after {}s",
            POOL_CLOSE_TIMEOUT_SECS
        ),
    }

    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
