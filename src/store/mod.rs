//! Content store collaborators
//!
//! The engine only needs three dimension reads and one aggregation query. The
//! trait is the seam between the engine and whatever holds the content; it
//! owns connections, pooling and transactions, the engine owns none of it.

use anyhow::Result;
use async_trait::async_trait;

use crate::coverage::query::{AggregationRequest, AggregationRow};
use crate::coverage::types::{CountryRecord, Industry, IndustryHierarchy};

pub mod memory;
pub mod postgres;

pub use memory::{ContentKind, ContentRecord, MemoryStore};
pub use postgres::PgCoverageStore;

#[async_trait]
pub trait CoverageStore: Send + Sync {
    /// All published countries ordered by name
    async fn fetch_countries(&self) -> Result<Vec<CountryRecord>>;

    /// All industries ordered by name
    async fn fetch_industries(&self) -> Result<Vec<Industry>>;

    /// Sector / sub-sector placement per industry (may be partial)
    async fn fetch_industry_hierarchy(&self) -> Result<Vec<IndustryHierarchy>>;

    /// Sparse per-pair counts for the request
    async fn run_aggregation(&self, request: &AggregationRequest) -> Result<Vec<AggregationRow>>;

    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> Result<()>;
}
