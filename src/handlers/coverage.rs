//! Coverage dashboard handlers
//!
//! Thin wrappers over [`CoverageService`](crate::coverage::CoverageService):
//! validate the query string, call the service, map failures to [`AppError`].

use axum::{
    extract::{Query, State},
    response::Json,
};

use super::router::AppState;
use crate::coverage::{self, CoverageFilters, CoverageMatrixResponse, LegendEntry};
use crate::errors::{AppError, ValidationErrorExt};
use crate::validation::MatrixQuery;

/// GET /api/coverage/filters
#[tracing::instrument(skip(state))]
pub async fn get_filters(State(state): State<AppState>) -> Result<Json<CoverageFilters>, AppError> {
    let filters = state
        .service()
        .filters()
        .await
        .map_err(|e| AppError::store("fetch coverage filters", e))?;

    Ok(Json(filters.as_ref().clone()))
}

/// GET /api/coverage/matrix
#[tracing::instrument(skip(state))]
pub async fn get_matrix(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> Result<Json<CoverageMatrixResponse>, AppError> {
    let params = query.into_params().map_validation_err("mode")?;

    let matrix = state
        .service()
        .matrix(&params)
        .await
        .map_err(|e| AppError::store("fetch coverage matrix", e))?;

    Ok(Json(matrix.as_ref().clone()))
}

/// GET /api/coverage/legend
pub async fn get_legend() -> Json<Vec<LegendEntry>> {
    Json(coverage::legend())
}

#[cfg(test)]
mod tests {
    use super::super::test_helpers::{get, send, TestHarness};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_bad_mode_is_400() {
        let harness = TestHarness::seeded();
        let (status, body) = send(harness.router(), get("/api/coverage/matrix?mode=all")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
        assert_eq!(
            body["message"],
            "Invalid mode. Must be one of: actors, events, regulations, total"
        );
        assert_eq!(harness.store.aggregation_calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_opaque_500() {
        let harness = TestHarness::seeded();
        harness.store.fail_with("relation \"published_countries\" does not exist");
        let (status, body) = send(harness.router(), get("/api/coverage/matrix")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "STORE_ERROR");
        assert_eq!(body["message"], "Failed to fetch coverage matrix");
    }

    #[tokio::test]
    async fn test_legend_order() {
        let harness = TestHarness::new();
        let (status, body) = send(harness.router(), get("/api/coverage/legend")).await;
        assert_eq!(status, StatusCode::OK);
        let levels: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["level"].as_str().unwrap())
            .collect();
        assert_eq!(
            levels,
            vec!["none", "veryLow", "low", "medium", "high", "veryHigh"]
        );
        assert_eq!(body[5]["color"], "#22c55e");
    }
}
