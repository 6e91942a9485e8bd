//! Postgres-backed content store
//!
//! Reads the published dimension tables and runs the aggregation statement
//! rendered by [`AggregationRequest::to_sql`]. Queries are built at runtime
//! (the aggregation text depends on the request), so rows are mapped through
//! `FromRow` rather than compile-time checked macros.

use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tracing::{debug, info};

use super::CoverageStore;
use crate::config::DatabaseConfig;
use crate::coverage::query::{AggregationRequest, AggregationRow};
use crate::coverage::types::{CountryRecord, Industry, IndustryHierarchy};
use crate::metrics::STORE_QUERY_DURATION;

const COUNTRIES_SQL: &str = "SELECT id::text AS id, name FROM published_countries ORDER BY name";

const INDUSTRIES_SQL: &str =
    "SELECT id::text AS id, name FROM published_briefs WHERE type = 'industry' ORDER BY name";

const HIERARCHY_SQL: &str = r#"
SELECT
    ind.id::text AS industry_id,
    COALESCE(subsec.name, '') AS subsector_name,
    COALESCE(sec.name, '') AS sector_name
FROM published_briefs ind
LEFT JOIN brief_tree bt1 ON bt1.child_id = ind.id
LEFT JOIN published_briefs subsec ON subsec.id = bt1.parent_id AND subsec.type = 'sub-sector'
LEFT JOIN brief_tree bt2 ON bt2.child_id = subsec.id
LEFT JOIN published_briefs sec ON sec.id = bt2.parent_id AND sec.type = 'sector'
WHERE ind.type = 'industry'
"#;

#[derive(Debug, sqlx::FromRow)]
struct NamedRow {
    id: String,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct HierarchyRow {
    industry_id: String,
    subsector_name: String,
    sector_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MatrixRow {
    country_id: String,
    industry_id: String,
    count: Option<i64>,
    actor_sum: Option<i64>,
    event_sum: Option<i64>,
    regulation_sum: Option<i64>,
}

/// Postgres counts are `bigint`; negative values cannot occur but clamp anyway
fn to_count(v: i64) -> u64 {
    v.max(0) as u64
}

impl From<MatrixRow> for AggregationRow {
    fn from(row: MatrixRow) -> Self {
        Self {
            country_id: row.country_id,
            industry_id: row.industry_id,
            count: row.count.map(to_count).unwrap_or(0),
            actor_sum: row.actor_sum.map(to_count),
            event_sum: row.event_sum.map(to_count),
            regulation_sum: row.regulation_sum.map(to_count),
        }
    }
}

pub struct PgCoverageStore {
    pool: PgPool,
}

impl PgCoverageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a lazily-connecting pool from the database settings
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .context("DATABASE_URL is not set")?;

        let mut options: PgConnectOptions = url.parse().context("Invalid DATABASE_URL")?;
        if config.require_ssl {
            options = options.ssl_mode(PgSslMode::Require);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy_with(options);

        info!(
            max_connections = config.max_connections,
            require_ssl = config.require_ssl,
            "Postgres pool configured"
        );
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn observe(query: &str, started: Instant) {
    STORE_QUERY_DURATION
        .with_label_values(&[query])
        .observe(started.elapsed().as_secs_f64());
}

#[async_trait]
impl CoverageStore for PgCoverageStore {
    async fn fetch_countries(&self) -> Result<Vec<CountryRecord>> {
        let started = Instant::now();
        let rows: Vec<NamedRow> = sqlx::query_as(COUNTRIES_SQL)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch countries")?;
        observe("countries", started);

        Ok(rows
            .into_iter()
            .map(|r| CountryRecord { id: r.id, name: r.name })
            .collect())
    }

    async fn fetch_industries(&self) -> Result<Vec<Industry>> {
        let started = Instant::now();
        let rows: Vec<NamedRow> = sqlx::query_as(INDUSTRIES_SQL)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch industries")?;
        observe("industries", started);

        Ok(rows
            .into_iter()
            .map(|r| Industry { id: r.id, name: r.name })
            .collect())
    }

    async fn fetch_industry_hierarchy(&self) -> Result<Vec<IndustryHierarchy>> {
        let started = Instant::now();
        let rows: Vec<HierarchyRow> = sqlx::query_as(HIERARCHY_SQL)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch industry hierarchy")?;
        observe("hierarchy", started);

        Ok(rows
            .into_iter()
            .map(|r| IndustryHierarchy {
                industry_id: r.industry_id,
                subsector_name: r.subsector_name,
                sector_name: r.sector_name,
            })
            .collect())
    }

    async fn run_aggregation(&self, request: &AggregationRequest) -> Result<Vec<AggregationRow>> {
        let stmt = request.to_sql();
        debug!(
            mode = %request.mode,
            binds = stmt.binds.len(),
            breakdown = request.include_breakdown,
            "Running coverage aggregation"
        );

        let started = Instant::now();
        let mut query = sqlx::query_as::<_, MatrixRow>(&stmt.text);
        for values in stmt.binds {
            query = query.bind(values);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to run coverage aggregation")?;
        observe("aggregation", started);

        Ok(rows.into_iter().map(AggregationRow::from).collect())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }
}
