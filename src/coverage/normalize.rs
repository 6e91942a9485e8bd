//! Normalization engine
//!
//! Raw counts conflate "this pair is under-covered" with "this country is
//! small". Each cell is therefore scored against a country-relative baseline:
//!
//! ```text
//! scaled_expected = expected(country) / median(expected over countries)
//! score           = raw / (scaled_expected * median(positive raw counts))
//! ```
//!
//! Both medians depend on the current filter selection, so nothing here is
//! cached between requests.

use super::levels::classify;
use super::types::{CountryRecord, CoverageLevel, CoverageThresholds};
use super::weights::country_weight;
use crate::constants::{
    EMPTY_MEDIAN_COUNT, EMPTY_MEDIAN_EXPECTED, FALLBACK_THRESHOLD_HIGH, FALLBACK_THRESHOLD_LOW,
    FALLBACK_THRESHOLD_MEDIUM, THRESHOLD_HIGH_PERCENTILE, THRESHOLD_LOW_PERCENTILE,
    THRESHOLD_MEDIUM_PERCENTILE, UNKNOWN_COUNTRY_EXPECTED_COVERAGE,
};

/// Expected coverage of a country for normalization purposes
pub fn country_expected_coverage(country_name: &str) -> f64 {
    country_weight(country_name)
        .map(|w| w.expected_coverage())
        .unwrap_or(UNKNOWN_COUNTRY_EXPECTED_COVERAGE)
}

/// Element at `floor(len * fraction)` of an ascending slice
fn floor_indexed<T: Copy>(sorted: &[T], fraction: f64) -> Option<T> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((sorted.len() as f64) * fraction).floor() as usize;
    sorted.get(idx.min(sorted.len() - 1)).copied()
}

/// Strictly positive counts, ascending
fn positive_sorted(counts: &[u64]) -> Vec<u64> {
    let mut positive: Vec<u64> = counts.iter().copied().filter(|&c| c > 0).collect();
    positive.sort_unstable();
    positive
}

/// Median (upper-middle on even length) of the expected-coverage values
pub fn median_expected(expected: &[f64]) -> f64 {
    let mut sorted = expected.to_vec();
    sorted.sort_by(f64::total_cmp);
    floor_indexed(&sorted, 0.5).unwrap_or(EMPTY_MEDIAN_EXPECTED)
}

/// Median (upper-middle on even length) of strictly positive counts
pub fn median_positive_count(counts: &[u64]) -> u64 {
    floor_indexed(&positive_sorted(counts), 0.5).unwrap_or(EMPTY_MEDIAN_COUNT)
}

/// Classify a dense row-major matrix given each row's expected coverage.
///
/// `expected.len()` is the number of country rows; `counts.len()` must be
/// `expected.len() * industry_count`. Zero counts short-circuit to `None`.
pub fn normalize_with_expected(
    expected: &[f64],
    counts: &[u64],
    industry_count: usize,
) -> Vec<CoverageLevel> {
    debug_assert_eq!(counts.len(), expected.len() * industry_count);

    let median_expected = median_expected(expected);
    let median_count = median_positive_count(counts) as f64;

    let mut levels = vec![CoverageLevel::None; counts.len()];
    for (country_idx, &country_expected) in expected.iter().enumerate() {
        let scaled_expected = country_expected / median_expected;
        let row = country_idx * industry_count;

        for (offset, level) in levels[row..row + industry_count].iter_mut().enumerate() {
            let raw = counts[row + offset];
            if raw == 0 {
                continue;
            }
            *level = classify(raw as f64 / (scaled_expected * median_count));
        }
    }
    levels
}

/// Classify a dense matrix using the static weight table for each country
pub fn normalize_coverage(
    countries: &[CountryRecord],
    counts: &[u64],
    industry_count: usize,
) -> Vec<CoverageLevel> {
    let expected: Vec<f64> = countries
        .iter()
        .map(|c| country_expected_coverage(&c.name))
        .collect();
    normalize_with_expected(&expected, counts, industry_count)
}

/// 50th / 75th / 90th percentile of strictly positive counts (display only)
pub fn compute_thresholds(counts: &[u64]) -> CoverageThresholds {
    let positive = positive_sorted(counts);
    if positive.is_empty() {
        return CoverageThresholds {
            low: FALLBACK_THRESHOLD_LOW,
            medium: FALLBACK_THRESHOLD_MEDIUM,
            high: FALLBACK_THRESHOLD_HIGH,
        };
    }

    let low = floor_indexed(&positive, THRESHOLD_LOW_PERCENTILE).unwrap_or(1);
    let medium = floor_indexed(&positive, THRESHOLD_MEDIUM_PERCENTILE).unwrap_or(low);
    let high = floor_indexed(&positive, THRESHOLD_HIGH_PERCENTILE).unwrap_or(medium);
    CoverageThresholds { low, medium, high }
}
