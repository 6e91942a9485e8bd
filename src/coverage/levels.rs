//! Level classifier: normalized score to ordinal coverage level

use super::types::CoverageLevel;
use crate::constants::{LEVEL_HIGH_MAX, LEVEL_LOW_MAX, LEVEL_MEDIUM_MAX, LEVEL_VERY_LOW_MAX};

/// Map a non-negative normalized score onto the six-step ladder.
///
/// Negative scores are never produced by normalization; they classify as
/// `VeryLow` rather than panicking.
pub fn classify(score: f64) -> CoverageLevel {
    if score == 0.0 {
        CoverageLevel::None
    } else if score < LEVEL_VERY_LOW_MAX {
        CoverageLevel::VeryLow
    } else if score < LEVEL_LOW_MAX {
        CoverageLevel::Low
    } else if score < LEVEL_MEDIUM_MAX {
        CoverageLevel::Medium
    } else if score < LEVEL_HIGH_MAX {
        CoverageLevel::High
    } else {
        CoverageLevel::VeryHigh
    }
}
