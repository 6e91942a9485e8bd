//! Router Configuration - Centralized route definitions

use axum::{routing::get, Router};
use std::sync::Arc;

use super::state::CoverageState;
use super::{coverage, health};

/// Application state type alias
pub type AppState = Arc<CoverageState>;

/// Probe and scrape endpoints
pub fn build_public_routes(state: AppState) -> Router {
    Router::new()
        // =================================================================
        // HEALTH & KUBERNETES PROBES
        // =================================================================
        .route("/health", get(health::health))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        // =================================================================
        // METRICS (PROMETHEUS)
        // =================================================================
        .route("/metrics", get(health::metrics_endpoint))
        .with_state(state)
}

/// Dashboard data endpoints
pub fn build_coverage_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/coverage/filters", get(coverage::get_filters))
        .route("/api/coverage/matrix", get(coverage::get_matrix))
        .route("/api/coverage/legend", get(coverage::get_legend))
        .with_state(state)
}

/// Build the complete router. Layers are applied by the caller.
pub fn build_router(state: AppState) -> Router {
    let public = build_public_routes(state.clone());
    let api = build_coverage_routes(state);

    Router::new().merge(public).merge(api)
}
