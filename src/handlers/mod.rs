//! HTTP API Handlers

// Core modules
pub mod router;
pub mod state;

// Health and metrics
pub mod health;

// Coverage dashboard
pub mod coverage;

// Test utilities (compiled only in test builds)
#[cfg(test)]
pub mod test_helpers;

pub use router::{build_coverage_routes, build_public_routes, build_router, AppState};
pub use state::CoverageState;
