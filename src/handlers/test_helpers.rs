//! Shared test utilities for handler unit tests.
//!
//! [`TestHarness`] wires the full router over an in-process [`MemoryStore`],
//! keeping a handle to the store so tests can seed data, inject failures and
//! count aggregation calls.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tower::ServiceExt; // for oneshot()

use super::router::{build_router, AppState};
use super::state::CoverageState;
use crate::config::ServerConfig;
use crate::coverage::types::{ActorSubtype, EventType, RegulationType};
use crate::store::{ContentKind, ContentRecord, MemoryStore};

pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestHarness {
    /// Empty store, default config
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = Arc::new(CoverageState::new(store.clone(), ServerConfig::default()));
        Self { store, state }
    }

    /// Two countries, two industries in one sector, a handful of content
    pub fn seeded() -> Self {
        let harness = Self::new();
        harness
            .store
            .add_country("c-us", "United States")
            .add_country("c-lu", "Luxembourg")
            .add_industry("i-steel", "Steel")
            .add_industry("i-banks", "Banks")
            .add_hierarchy("i-banks", "Financials", "Banking")
            .add_hierarchy("i-steel", "Materials", "Metals")
            .add_content(
                ContentRecord::new("a1", ContentKind::Actor(ActorSubtype::Company))
                    .in_country("c-us")
                    .in_industry("i-steel"),
            )
            .add_content(
                ContentRecord::new("e1", ContentKind::Event(EventType::Quote))
                    .in_country("c-us")
                    .in_industry("i-steel"),
            )
            .add_content(
                ContentRecord::new("r1", ContentKind::Regulation(RegulationType::LegislativeActs))
                    .in_country("c-lu")
                    .in_industry("i-banks"),
            );
        harness
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}

// ---------- Request builders ----------

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// ---------- Response helpers ----------

/// Send a request through the router and return (status, JSON body).
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body_bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body_bytes).to_string())
        })
    };
    (status, json)
}

/// Send a request and deserialize the body into `T`.
pub async fn send_typed<T: DeserializeOwned>(app: Router, req: Request<Body>) -> (StatusCode, T) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body_bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value: T = serde_json::from_slice(&body_bytes).unwrap_or_else(|e| {
        panic!(
            "failed to deserialize response: {e}\nbody: {}",
            String::from_utf8_lossy(&body_bytes)
        )
    });
    (status, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageMatrixResponse;

    #[tokio::test]
    async fn test_seeded_matrix_round_trips_through_router() {
        let harness = TestHarness::seeded();
        let (status, matrix): (_, CoverageMatrixResponse) =
            send_typed(harness.router(), get("/api/coverage/matrix")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(matrix.count_for("c-us", "i-steel"), Some(2));
        assert_eq!(matrix.count_for("c-lu", "i-banks"), Some(1));
        assert_eq!(matrix.count_for("c-lu", "i-steel"), Some(0));
    }
}
