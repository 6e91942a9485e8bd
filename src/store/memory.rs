//! In-process content store
//!
//! Holds content records with their country / industry links and evaluates
//! aggregation requests with the same semantics as the SQL statement: distinct
//! counting per pair, narrowing filters, unlinked items silently excluded.
//! Used by tests and local demos.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::RwLock;

use super::CoverageStore;
use crate::coverage::query::{AggregationRequest, AggregationRow};
use crate::coverage::types::{
    ActorSubtype, CountryRecord, EventType, Industry, IndustryHierarchy, RegulationType,
};

/// What a content item is, with its filterable subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Actor(ActorSubtype),
    Event(EventType),
    Regulation(RegulationType),
}

/// One content item and its (possibly repeated) link rows
#[derive(Debug, Clone)]
pub struct ContentRecord {
    pub id: String,
    pub kind: ContentKind,
    pub country_ids: Vec<String>,
    pub industry_ids: Vec<String>,
}

impl ContentRecord {
    pub fn new(id: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            country_ids: Vec::new(),
            industry_ids: Vec::new(),
        }
    }

    pub fn in_country(mut self, country_id: impl Into<String>) -> Self {
        self.country_ids.push(country_id.into());
        self
    }

    pub fn in_industry(mut self, industry_id: impl Into<String>) -> Self {
        self.industry_ids.push(industry_id.into());
        self
    }
}

#[derive(Default)]
struct Tables {
    countries: Vec<CountryRecord>,
    industries: Vec<Industry>,
    hierarchy: Vec<IndustryHierarchy>,
    content: Vec<ContentRecord>,
}

/// Distinct content identities per dimension for one pair
#[derive(Default)]
struct PairSets<'a> {
    actors: HashSet<&'a str>,
    events: HashSet<(&'a str, EventType)>,
    regulations: HashSet<&'a str>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failure: RwLock<Option<String>>,
    aggregation_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_country(&self, id: impl Into<String>, name: impl Into<String>) -> &Self {
        self.tables.write().countries.push(CountryRecord {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn add_industry(&self, id: impl Into<String>, name: impl Into<String>) -> &Self {
        self.tables.write().industries.push(Industry {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn add_hierarchy(
        &self,
        industry_id: impl Into<String>,
        sector_name: impl Into<String>,
        subsector_name: impl Into<String>,
    ) -> &Self {
        self.tables.write().hierarchy.push(IndustryHierarchy {
            industry_id: industry_id.into(),
            sector_name: sector_name.into(),
            subsector_name: subsector_name.into(),
        });
        self
    }

    pub fn add_content(&self, record: ContentRecord) -> &Self {
        self.tables.write().content.push(record);
        self
    }

    /// Make every subsequent call fail with `message` until cleared
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write() = Some(message.into());
    }

    pub fn clear_failure(&self) {
        *self.failure.write() = None;
    }

    /// Number of aggregation queries executed so far
    pub fn aggregation_calls(&self) -> usize {
        self.aggregation_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.read().as_ref() {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }

    fn aggregate(&self, request: &AggregationRequest) -> Vec<AggregationRow> {
        let tables = self.tables.read();
        let mut pairs: BTreeMap<(&str, &str), PairSets<'_>> = BTreeMap::new();

        for record in &tables.content {
            let accepted = match record.kind {
                ContentKind::Actor(s) => request.computes_actors() && request.accepts_actor(s),
                ContentKind::Event(t) => request.computes_events() && request.accepts_event(t),
                ContentKind::Regulation(t) => {
                    request.computes_regulations() && request.accepts_regulation(t)
                }
            };
            if !accepted {
                continue;
            }

            // Items without a country or an industry link fan out to nothing
            for country_id in &record.country_ids {
                for industry_id in &record.industry_ids {
                    let sets = pairs
                        .entry((country_id.as_str(), industry_id.as_str()))
                        .or_default();
                    match record.kind {
                        ContentKind::Actor(_) => {
                            sets.actors.insert(record.id.as_str());
                        }
                        ContentKind::Event(t) => {
                            sets.events.insert((record.id.as_str(), t));
                        }
                        ContentKind::Regulation(_) => {
                            sets.regulations.insert(record.id.as_str());
                        }
                    }
                }
            }
        }

        pairs
            .into_iter()
            .filter_map(|((country_id, industry_id), sets)| {
                request.make_row(
                    country_id,
                    industry_id,
                    sets.actors.len() as u64,
                    sets.events.len() as u64,
                    sets.regulations.len() as u64,
                )
            })
            .collect()
    }
}

#[async_trait]
impl CoverageStore for MemoryStore {
    async fn fetch_countries(&self) -> Result<Vec<CountryRecord>> {
        self.check_failure()?;
        let mut countries = self.tables.read().countries.clone();
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(countries)
    }

    async fn fetch_industries(&self) -> Result<Vec<Industry>> {
        self.check_failure()?;
        let mut industries = self.tables.read().industries.clone();
        industries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(industries)
    }

    async fn fetch_industry_hierarchy(&self) -> Result<Vec<IndustryHierarchy>> {
        self.check_failure()?;
        Ok(self.tables.read().hierarchy.clone())
    }

    async fn run_aggregation(&self, request: &AggregationRequest) -> Result<Vec<AggregationRow>> {
        self.check_failure()?;
        self.aggregation_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.aggregate(request))
    }

    async fn ping(&self) -> Result<()> {
        self.check_failure()
    }
}
