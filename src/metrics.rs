//! Prometheus metrics for the coverage service
//!
//! Labels are bounded: normalized paths, mode names, query names and error
//! codes. Filter selections never become labels.

use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
};

lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Request Metrics
    // ============================================================================

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "coverage_http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("coverage_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"]
    ).unwrap();

    // ============================================================================
    // Matrix Metrics
    // ============================================================================

    /// Response cache lookups
    pub static ref CACHE_LOOKUPS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("coverage_cache_lookups_total", "Response cache lookups"),
        &["kind", "result"]  // kind: "matrix" | "filters", result: "hit" | "miss"
    ).unwrap();

    /// Time to assemble a matrix on a cache miss
    pub static ref MATRIX_BUILD_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "coverage_matrix_build_duration_seconds",
            "Matrix assembly duration on cache miss"
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["mode"]
    ).unwrap();

    /// Cells in the most recently assembled matrix
    pub static ref MATRIX_CELLS: IntGauge = IntGauge::new(
        "coverage_matrix_cells",
        "Number of cells in the last assembled matrix"
    ).unwrap();

    // ============================================================================
    // Store Metrics
    // ============================================================================

    /// Store query duration
    pub static ref STORE_QUERY_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "coverage_store_query_duration_seconds",
            "Content store query duration"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["query"]  // countries, industries, hierarchy, aggregation
    ).unwrap();

    // ============================================================================
    // Error Metrics
    // ============================================================================

    /// Total errors by code
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("coverage_errors_total", "Total errors by code"),
        &["code"]
    ).unwrap();
}

/// Register all metrics with the global registry
pub fn register_metrics() -> Result<(), prometheus::Error> {
    METRICS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;

    METRICS_REGISTRY.register(Box::new(CACHE_LOOKUPS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(MATRIX_BUILD_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(MATRIX_CELLS.clone()))?;

    METRICS_REGISTRY.register(Box::new(STORE_QUERY_DURATION.clone()))?;

    METRICS_REGISTRY.register(Box::new(ERRORS_TOTAL.clone()))?;

    Ok(())
}

/// Records elapsed time into a histogram when dropped
pub struct Timer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl Timer {
    pub fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
