//! Documented constants for the coverage engine
//!
//! Every tunable number used by normalization, classification and caching lives
//! here so the scoring model can be read in one place.

// =============================================================================
// EXPECTED COVERAGE MODEL
// Cobb-Douglas style weighting: coverage grows sub-linearly in both economic
// size and population, with GDP weighted three times as strongly.
// =============================================================================

/// Exponent applied to GDP (trillions USD) in the expected-coverage formula
pub const GDP_EXPONENT: f64 = 0.75;

/// Exponent applied to population (millions) in the expected-coverage formula
pub const POPULATION_EXPONENT: f64 = 0.25;

/// Floor for missing or non-positive GDP (trillions USD)
///
/// Keeps the baseline strictly positive so a normalized score is always defined.
pub const MIN_GDP_TRILLIONS: f64 = 0.001;

/// Floor for missing or non-positive population (millions)
pub const MIN_POPULATION_MILLIONS: f64 = 0.01;

/// Expected coverage assigned to countries absent from the weight table
/// during normalization.
///
/// Note this is a constant baseline, not the floored formula value: sorting
/// uses `expected_coverage(MIN_GDP_TRILLIONS, MIN_POPULATION_MILLIONS)`,
/// normalization uses this.
pub const UNKNOWN_COUNTRY_EXPECTED_COVERAGE: f64 = 0.1;

/// Median expected coverage used when the country list is empty
pub const EMPTY_MEDIAN_EXPECTED: f64 = 1.0;

/// Median raw count used when no cell has a positive count
pub const EMPTY_MEDIAN_COUNT: u64 = 1;

// =============================================================================
// LEVEL LADDER
// Normalized score = raw / (scaled_expected * median_count). A score of 1.0
// means "exactly what a median-sized country gets at the median count".
// =============================================================================

/// Upper bound (exclusive) of the `veryLow` band
pub const LEVEL_VERY_LOW_MAX: f64 = 0.2;

/// Upper bound (exclusive) of the `low` band
pub const LEVEL_LOW_MAX: f64 = 0.5;

/// Upper bound (exclusive) of the `medium` band
pub const LEVEL_MEDIUM_MAX: f64 = 1.0;

/// Upper bound (exclusive) of the `high` band; anything at or above is `veryHigh`
pub const LEVEL_HIGH_MAX: f64 = 2.0;

// =============================================================================
// DISPLAY THRESHOLDS
// Percentiles of strictly positive raw counts. Display metadata only; they do
// not feed level classification.
// =============================================================================

/// Percentile reported as `thresholds.low`
pub const THRESHOLD_LOW_PERCENTILE: f64 = 0.5;

/// Percentile reported as `thresholds.medium`
pub const THRESHOLD_MEDIUM_PERCENTILE: f64 = 0.75;

/// Percentile reported as `thresholds.high`
pub const THRESHOLD_HIGH_PERCENTILE: f64 = 0.9;

/// Thresholds returned when the matrix has no positive count at all
pub const FALLBACK_THRESHOLD_LOW: u64 = 10;
pub const FALLBACK_THRESHOLD_MEDIUM: u64 = 50;
pub const FALLBACK_THRESHOLD_HIGH: u64 = 100;

// =============================================================================
// CACHING
// =============================================================================

/// Default time-to-live for memoized responses (5 minutes)
///
/// The key space is mode x filter combinations, so entries are few and the
/// TTL bounds staleness rather than memory.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default upper bound on memoized entries
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 1024;

/// Cache key under which the filter catalog is stored
pub const FILTERS_CACHE_KEY: &str = "coverage_filters";

/// Prefix of matrix cache keys
pub const MATRIX_CACHE_PREFIX: &str = "matrix";
