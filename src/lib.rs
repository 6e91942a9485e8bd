//! Coverage Matrix Library
//!
//! Measures how thoroughly an editorial content database covers each
//! (country, industry) pair, normalized so small economies are not
//! automatically flagged as under-covered.
//!
//! # Layout
//! - [`coverage`]: weights, normalization, aggregation requests, assembly
//! - [`store`]: the content store seam with Postgres and in-memory backends
//! - [`handlers`]: axum routes for the dashboard and operational probes

pub mod config;
pub mod constants;
pub mod coverage;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod store;
pub mod tracing_setup;
pub mod validation;

// Re-export dependencies so tests use the same versions
pub use chrono;
pub use parking_lot;
