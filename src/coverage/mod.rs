//! Coverage engine: weights, normalization, aggregation and assembly

pub mod cache;
pub mod levels;
pub mod matrix;
pub mod normalize;
pub mod query;
pub mod types;
pub mod weights;

pub use levels::classify;
pub use matrix::CoverageService;
pub use types::{
    ActorSubtype, Country, CoverageBreakdown, CoverageFilters, CoverageLevel,
    CoverageMatrixResponse, CoverageMode, CoverageThresholds, EventType, Industry, LegendEntry,
    MatrixParams, RegulationType,
};

/// Legend rows in ascending level order
pub fn legend() -> Vec<LegendEntry> {
    CoverageLevel::ALL
        .iter()
        .map(|&level| LegendEntry {
            level,
            label: level.label(),
            color: level.color(),
        })
        .collect()
}
