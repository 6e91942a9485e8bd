//! Matrix assembler and filter catalog
//!
//! [`CoverageService`] is the single entry point used by the HTTP layer. It
//! owns the response caches and a handle to the content store:
//!
//! 1. Read countries, industries and the industry hierarchy concurrently
//! 2. Order countries by expected coverage, industries by sector hierarchy
//! 3. Run the aggregation and densify the sparse rows into row-major arrays
//! 4. Derive display thresholds and per-cell levels
//! 5. Memoize the assembled response
//!
//! A failed build is propagated as-is and never cached.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use super::cache::{generate_cache_key, KeyPart, TtlCache};
use super::normalize::{compute_thresholds, normalize_coverage};
use super::query::{AggregationRequest, AggregationRow};
use super::types::{
    ActorSubtype, Country, CountryRecord, CoverageBreakdown, CoverageFilters,
    CoverageMatrixResponse, EventType, Industry, IndustryHierarchy, MatrixParams, RegulationType,
};
use super::weights::{country_display_name, sort_weight};
use crate::config::CacheConfig;
use crate::constants::{FILTERS_CACHE_KEY, MATRIX_CACHE_PREFIX};
use crate::metrics::{Timer, CACHE_LOOKUPS_TOTAL, MATRIX_BUILD_DURATION, MATRIX_CELLS};
use crate::store::CoverageStore;

/// Cache key for a matrix request.
///
/// Built from the selection as given: an empty filter and an explicit
/// all-members filter produce different keys for the same response.
pub fn matrix_cache_key(params: &MatrixParams) -> String {
    fn tokens<T: Copy>(values: &[T], as_str: impl Fn(&T) -> &'static str) -> KeyPart {
        KeyPart::from(values.iter().map(|v| as_str(v).to_string()).collect::<Vec<_>>())
    }

    generate_cache_key([
        ("prefix", KeyPart::from(MATRIX_CACHE_PREFIX)),
        ("mode", KeyPart::from(params.mode.as_str())),
        ("actors", tokens(&params.actor_subtypes, ActorSubtype::as_str)),
        ("events", tokens(&params.event_types, EventType::as_str)),
        ("regs", tokens(&params.regulation_types, RegulationType::as_str)),
        ("breakdown", KeyPart::from(params.include_breakdown)),
    ])
}

/// Case-insensitive comparison with a byte-order tiebreak, so the order is
/// total and stable across platforms.
fn name_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Order industries by (sector, sub-sector, name). Industries missing from
/// the hierarchy sort as if both levels were empty.
pub fn sort_industries(industries: &mut [Industry], hierarchy: &[IndustryHierarchy]) {
    let placement: HashMap<&str, (&str, &str)> = hierarchy
        .iter()
        .map(|h| {
            (
                h.industry_id.as_str(),
                (h.sector_name.as_str(), h.subsector_name.as_str()),
            )
        })
        .collect();

    industries.sort_by(|a, b| {
        let (sector_a, sub_a) = placement.get(a.id.as_str()).copied().unwrap_or(("", ""));
        let (sector_b, sub_b) = placement.get(b.id.as_str()).copied().unwrap_or(("", ""));
        name_cmp(sector_a, sector_b)
            .then_with(|| name_cmp(sub_a, sub_b))
            .then_with(|| name_cmp(&a.name, &b.name))
    });
}

/// Order countries by expected coverage, largest first. Ties fall back to name.
pub fn sort_countries(countries: &mut [CountryRecord]) {
    countries.sort_by(|a, b| {
        sort_weight(&b.name)
            .total_cmp(&sort_weight(&a.name))
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn with_display_names(countries: &[CountryRecord]) -> Vec<Country> {
    countries
        .iter()
        .map(|c| Country {
            id: c.id.clone(),
            name: c.name.clone(),
            display_name: country_display_name(&c.name),
        })
        .collect()
}

/// Scatter sparse rows into dense row-major arrays.
///
/// Returns `(counts, breakdown)`. Rows naming an id outside the dimension
/// lists are ignored.
pub fn densify(
    countries: &[CountryRecord],
    industries: &[Industry],
    rows: &[AggregationRow],
    include_breakdown: bool,
) -> (Vec<u64>, Option<CoverageBreakdown>) {
    let country_idx: HashMap<&str, usize> = countries
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();
    let industry_idx: HashMap<&str, usize> = industries
        .iter()
        .enumerate()
        .map(|(i, ind)| (ind.id.as_str(), i))
        .collect();

    let cells = countries.len() * industries.len();
    let mut counts = vec![0u64; cells];
    let mut breakdown = include_breakdown.then(|| CoverageBreakdown {
        actor_counts: vec![0; cells],
        event_counts: vec![0; cells],
        regulation_counts: vec![0; cells],
    });

    let mut ignored = 0usize;
    for row in rows {
        let (Some(&c), Some(&i)) = (
            country_idx.get(row.country_id.as_str()),
            industry_idx.get(row.industry_id.as_str()),
        ) else {
            ignored += 1;
            continue;
        };

        let idx = c * industries.len() + i;
        counts[idx] = row.count;
        if let Some(b) = breakdown.as_mut() {
            b.actor_counts[idx] = row.actor_sum.unwrap_or(0);
            b.event_counts[idx] = row.event_sum.unwrap_or(0);
            b.regulation_counts[idx] = row.regulation_sum.unwrap_or(0);
        }
    }

    if ignored > 0 {
        debug!(ignored, "Aggregation rows referenced unknown countries or industries");
    }

    (counts, breakdown)
}

fn record_lookup(kind: &str, hit: bool) {
    CACHE_LOOKUPS_TOTAL
        .with_label_values(&[kind, if hit { "hit" } else { "miss" }])
        .inc();
}

/// Assembles coverage matrices and the filter catalog on top of a store
pub struct CoverageService {
    store: Arc<dyn CoverageStore>,
    matrix_cache: TtlCache<CoverageMatrixResponse>,
    filters_cache: TtlCache<CoverageFilters>,
}

impl CoverageService {
    pub fn new(store: Arc<dyn CoverageStore>, cache: &CacheConfig) -> Self {
        Self::with_ttl(store, cache.ttl(), cache.max_entries)
    }

    pub fn with_ttl(store: Arc<dyn CoverageStore>, ttl: Duration, max_entries: u64) -> Self {
        Self {
            store,
            matrix_cache: TtlCache::new(ttl, max_entries),
            filters_cache: TtlCache::new(ttl, 4),
        }
    }

    pub fn store(&self) -> &Arc<dyn CoverageStore> {
        &self.store
    }

    /// Drop every memoized response
    pub fn invalidate(&self) {
        self.matrix_cache.invalidate_all();
        self.filters_cache.invalidate_all();
    }

    /// Memoized matrix for `params`
    #[tracing::instrument(skip(self, params), fields(mode = %params.mode, breakdown = params.include_breakdown))]
    pub async fn matrix(&self, params: &MatrixParams) -> Result<Arc<CoverageMatrixResponse>> {
        let key = matrix_cache_key(params);
        if let Some(cached) = self.matrix_cache.get(&key) {
            record_lookup("matrix", true);
            debug!(%key, "Matrix cache hit");
            return Ok(cached);
        }
        record_lookup("matrix", false);
        debug!(%key, "Matrix cache miss");

        let response = Arc::new(self.build_matrix(params).await?);
        self.matrix_cache.insert(key, Arc::clone(&response));
        Ok(response)
    }

    /// Assemble a matrix without consulting or populating the cache
    pub async fn build_matrix(&self, params: &MatrixParams) -> Result<CoverageMatrixResponse> {
        let _timer = Timer::new(MATRIX_BUILD_DURATION.with_label_values(&[params.mode.as_str()]));

        let (mut countries, mut industries, hierarchy) = tokio::try_join!(
            self.store.fetch_countries(),
            self.store.fetch_industries(),
            self.store.fetch_industry_hierarchy(),
        )?;

        sort_countries(&mut countries);
        sort_industries(&mut industries, &hierarchy);

        let request = AggregationRequest::from_params(params);
        let rows = self.store.run_aggregation(&request).await?;

        let (counts, breakdown) = densify(&countries, &industries, &rows, params.include_breakdown);
        let thresholds = compute_thresholds(&counts);
        let levels = normalize_coverage(&countries, &counts, industries.len());

        MATRIX_CELLS.set(counts.len() as i64);
        info!(
            countries = countries.len(),
            industries = industries.len(),
            rows = rows.len(),
            low = thresholds.low,
            medium = thresholds.medium,
            high = thresholds.high,
            "Coverage matrix assembled"
        );

        Ok(CoverageMatrixResponse {
            countries: with_display_names(&countries),
            industries,
            counts,
            levels,
            thresholds,
            breakdown,
        })
    }

    /// Memoized filter catalog
    #[tracing::instrument(skip(self))]
    pub async fn filters(&self) -> Result<Arc<CoverageFilters>> {
        if let Some(cached) = self.filters_cache.get(FILTERS_CACHE_KEY) {
            record_lookup("filters", true);
            return Ok(cached);
        }
        record_lookup("filters", false);

        let (countries, mut industries, hierarchy) = tokio::try_join!(
            self.store.fetch_countries(),
            self.store.fetch_industries(),
            self.store.fetch_industry_hierarchy(),
        )?;
        sort_industries(&mut industries, &hierarchy);

        let filters = Arc::new(CoverageFilters {
            countries: with_display_names(&countries),
            industries,
            actor_subtypes: ActorSubtype::ALL.to_vec(),
            event_types: EventType::ALL.to_vec(),
            regulation_types: RegulationType::ALL.to_vec(),
        });
        self.filters_cache
            .insert(FILTERS_CACHE_KEY, Arc::clone(&filters));
        Ok(filters)
    }
}
