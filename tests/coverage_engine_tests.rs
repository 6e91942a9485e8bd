//! Engine-level tests for matrix assembly over the in-memory store.
//!
//! Covers densification, mode isolation, filter widening and narrowing,
//! distinct counting, memoization and failure propagation.
//!
//! Run with: `cargo test --test coverage_engine_tests`

use std::sync::Arc;
use std::time::Duration;

use coverage_matrix::coverage::types::{
    ActorSubtype, CoverageLevel, CoverageMode, EventType, MatrixParams, RegulationType,
};
use coverage_matrix::coverage::CoverageService;
use coverage_matrix::store::{ContentKind, ContentRecord, MemoryStore};

// ═══════════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════════

fn service(store: &Arc<MemoryStore>) -> CoverageService {
    CoverageService::with_ttl(store.clone(), Duration::from_secs(300), 64)
}

fn actor(id: &str, subtype: ActorSubtype, country: &str, industry: &str) -> ContentRecord {
    ContentRecord::new(id, ContentKind::Actor(subtype))
        .in_country(country)
        .in_industry(industry)
}

fn event(id: &str, event_type: EventType, country: &str, industry: &str) -> ContentRecord {
    ContentRecord::new(id, ContentKind::Event(event_type))
        .in_country(country)
        .in_industry(industry)
}

fn regulation(id: &str, t: RegulationType, country: &str, industry: &str) -> ContentRecord {
    ContentRecord::new(id, ContentKind::Regulation(t))
        .in_country(country)
        .in_industry(industry)
}

/// France and Peru, steel and wine, no hierarchy
fn two_by_two() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .add_country("fr", "France")
        .add_country("pe", "Peru")
        .add_industry("steel", "Steel")
        .add_industry("wine", "Wine");
    store
}

// ═══════════════════════════════════════════════════════════════════════
// Densification
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_single_pair_densifies_with_zeros() {
    let store = two_by_two();
    for i in 0..5 {
        store.add_content(actor(&format!("a{i}"), ActorSubtype::Person, "fr", "steel"));
    }

    let matrix = service(&store)
        .matrix(&MatrixParams::new(CoverageMode::Actors))
        .await
        .unwrap();

    // France outranks Peru by expected coverage, Steel < Wine by name
    assert_eq!(matrix.countries[0].id, "fr");
    assert_eq!(matrix.industries[0].id, "steel");
    assert_eq!(matrix.counts, vec![5, 0, 0, 0]);
    assert_eq!(matrix.levels.len(), 4);
    assert_eq!(matrix.levels[1], CoverageLevel::None);
    assert!(matrix.breakdown.is_none());
}

#[tokio::test]
async fn test_empty_store_yields_fallback_thresholds() {
    let store = two_by_two();
    let matrix = service(&store).matrix(&MatrixParams::default()).await.unwrap();

    assert_eq!(matrix.counts, vec![0, 0, 0, 0]);
    assert!(matrix.levels.iter().all(|l| *l == CoverageLevel::None));
    assert_eq!(matrix.thresholds.low, 10);
    assert_eq!(matrix.thresholds.medium, 50);
    assert_eq!(matrix.thresholds.high, 100);
}

#[tokio::test]
async fn test_no_countries_gives_empty_matrix() {
    let store = Arc::new(MemoryStore::new());
    store.add_industry("steel", "Steel");
    let matrix = service(&store).matrix(&MatrixParams::default()).await.unwrap();

    assert!(matrix.countries.is_empty());
    assert_eq!(matrix.industries.len(), 1);
    assert!(matrix.counts.is_empty());
    assert!(matrix.levels.is_empty());
}

#[tokio::test]
async fn test_content_for_unknown_ids_is_ignored() {
    let store = two_by_two();
    store
        .add_content(actor("a1", ActorSubtype::Company, "xx", "steel"))
        .add_content(actor("a2", ActorSubtype::Company, "fr", "yy"))
        .add_content(actor("a3", ActorSubtype::Company, "pe", "wine"));

    let matrix = service(&store)
        .matrix(&MatrixParams::new(CoverageMode::Actors))
        .await
        .unwrap();
    assert_eq!(matrix.counts.iter().sum::<u64>(), 1);
    assert_eq!(matrix.count_for("pe", "wine"), Some(1));
}

// ═══════════════════════════════════════════════════════════════════════
// Modes and breakdown
// ═══════════════════════════════════════════════════════════════════════

fn mixed_store() -> Arc<MemoryStore> {
    let store = two_by_two();
    store
        .add_content(actor("a1", ActorSubtype::Person, "fr", "steel"))
        .add_content(actor("a2", ActorSubtype::Company, "fr", "steel"))
        .add_content(event("e1", EventType::Quote, "fr", "steel"))
        .add_content(event("e2", EventType::Post, "pe", "wine"))
        .add_content(regulation("r1", RegulationType::LegislativeActs, "fr", "wine"))
        .add_content(regulation("r2", RegulationType::OtherDocs, "fr", "steel"));
    store
}

#[tokio::test]
async fn test_total_sums_all_dimensions() {
    let store = mixed_store();
    let matrix = service(&store).matrix(&MatrixParams::default()).await.unwrap();
    assert_eq!(matrix.count_for("fr", "steel"), Some(4));
    assert_eq!(matrix.count_for("fr", "wine"), Some(1));
    assert_eq!(matrix.count_for("pe", "wine"), Some(1));
    assert_eq!(matrix.count_for("pe", "steel"), Some(0));
}

#[tokio::test]
async fn test_mode_isolation_with_breakdown() {
    let store = mixed_store();
    let svc = service(&store);

    let plain = svc
        .matrix(&MatrixParams::new(CoverageMode::Actors))
        .await
        .unwrap();
    let detailed = svc
        .matrix(&MatrixParams::new(CoverageMode::Actors).with_breakdown())
        .await
        .unwrap();

    // The breakdown never changes the primary count
    assert_eq!(plain.counts, detailed.counts);

    let breakdown = detailed.breakdown.as_ref().expect("breakdown requested");
    assert_eq!(breakdown.actor_counts, detailed.counts);
    let idx = |c: &str, i: &str| {
        let ci = detailed.countries.iter().position(|x| x.id == c).unwrap();
        let ii = detailed.industries.iter().position(|x| x.id == i).unwrap();
        detailed.index(ci, ii)
    };
    assert_eq!(breakdown.event_counts[idx("fr", "steel")], 1);
    assert_eq!(breakdown.event_counts[idx("pe", "wine")], 1);
    assert_eq!(breakdown.regulation_counts[idx("fr", "wine")], 1);
    assert_eq!(detailed.count_for("pe", "wine"), Some(0));
}

#[tokio::test]
async fn test_total_breakdown_sums_to_count() {
    let store = mixed_store();
    let matrix = service(&store)
        .matrix(&MatrixParams::default().with_breakdown())
        .await
        .unwrap();
    let b = matrix.breakdown.as_ref().unwrap();
    for idx in 0..matrix.counts.len() {
        assert_eq!(
            matrix.counts[idx],
            b.actor_counts[idx] + b.event_counts[idx] + b.regulation_counts[idx]
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Filters
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_empty_filter_equals_all_members() {
    let store = mixed_store();
    let svc = service(&store);

    let implicit = svc
        .matrix(&MatrixParams::new(CoverageMode::Actors))
        .await
        .unwrap();
    let explicit = svc
        .matrix(&MatrixParams::new(CoverageMode::Actors).with_actor_subtypes(ActorSubtype::ALL))
        .await
        .unwrap();

    assert_eq!(implicit.counts, explicit.counts);
    assert_eq!(implicit.levels, explicit.levels);
    // Different cache keys, so both were computed
    assert_eq!(store.aggregation_calls(), 2);
}

#[tokio::test]
async fn test_filters_only_narrow() {
    let store = mixed_store();
    let svc = service(&store);

    let people = svc
        .matrix(&MatrixParams::new(CoverageMode::Actors).with_actor_subtypes([ActorSubtype::Person]))
        .await
        .unwrap();
    assert_eq!(people.count_for("fr", "steel"), Some(1));

    let posts = svc
        .matrix(&MatrixParams::new(CoverageMode::Events).with_event_types([EventType::Post]))
        .await
        .unwrap();
    assert_eq!(posts.count_for("fr", "steel"), Some(0));
    assert_eq!(posts.count_for("pe", "wine"), Some(1));
}

#[tokio::test]
async fn test_filter_of_other_dimension_does_not_affect_mode() {
    let store = mixed_store();
    let matrix = service(&store)
        .matrix(
            &MatrixParams::new(CoverageMode::Regulations)
                .with_actor_subtypes([ActorSubtype::GovBody]),
        )
        .await
        .unwrap();
    assert_eq!(matrix.count_for("fr", "steel"), Some(1));
    assert_eq!(matrix.count_for("fr", "wine"), Some(1));
}

// ═══════════════════════════════════════════════════════════════════════
// Distinct counting
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_repeated_links_count_once() {
    let store = two_by_two();
    store.add_content(
        ContentRecord::new("reg-7", ContentKind::Regulation(RegulationType::PolicyDocs))
            .in_country("fr")
            .in_country("fr")
            .in_industry("steel")
            .in_industry("steel")
            .in_industry("wine"),
    );

    let matrix = service(&store)
        .matrix(&MatrixParams::new(CoverageMode::Regulations))
        .await
        .unwrap();
    assert_eq!(matrix.count_for("fr", "steel"), Some(1));
    assert_eq!(matrix.count_for("fr", "wine"), Some(1));
}

#[tokio::test]
async fn test_items_without_industry_are_excluded() {
    let store = two_by_two();
    store
        .add_content(ContentRecord::new("q1", ContentKind::Event(EventType::Quote)).in_country("fr"))
        .add_content(event("q2", EventType::Quote, "fr", "steel"));

    let matrix = service(&store)
        .matrix(&MatrixParams::new(CoverageMode::Events))
        .await
        .unwrap();
    assert_eq!(matrix.counts.iter().sum::<u64>(), 1);
}

// ═══════════════════════════════════════════════════════════════════════
// Memoization and failures
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_second_call_is_served_from_cache() {
    let store = mixed_store();
    let svc = service(&store);
    let params = MatrixParams::new(CoverageMode::Events).with_event_types([
        EventType::Quote,
        EventType::Post,
    ]);
    let reordered = MatrixParams::new(CoverageMode::Events).with_event_types([
        EventType::Post,
        EventType::Quote,
    ]);

    let first = svc.matrix(&params).await.unwrap();
    let second = svc.matrix(&reordered).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.aggregation_calls(), 1);
}

#[tokio::test]
async fn test_expired_entry_is_recomputed() {
    let store = mixed_store();
    let svc = CoverageService::with_ttl(store.clone(), Duration::from_millis(50), 64);

    svc.matrix(&MatrixParams::default()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    svc.matrix(&MatrixParams::default()).await.unwrap();

    assert_eq!(store.aggregation_calls(), 2);
}

#[tokio::test]
async fn test_failure_propagates_and_is_not_cached() {
    let store = mixed_store();
    let svc = service(&store);

    store.fail_with("connection refused");
    let err = svc.matrix(&MatrixParams::default()).await.unwrap_err();
    assert!(err.to_string().contains("connection refused"));

    store.clear_failure();
    let matrix = svc.matrix(&MatrixParams::default()).await.unwrap();
    assert_eq!(matrix.count_for("fr", "steel"), Some(4));
    assert_eq!(store.aggregation_calls(), 1);
}

#[tokio::test]
async fn test_invalidate_forces_rebuild() {
    let store = mixed_store();
    let svc = service(&store);

    svc.matrix(&MatrixParams::default()).await.unwrap();
    store.add_content(actor("a9", ActorSubtype::Org, "pe", "steel"));
    let stale = svc.matrix(&MatrixParams::default()).await.unwrap();
    assert_eq!(stale.count_for("pe", "steel"), Some(0));

    svc.invalidate();
    let fresh = svc.matrix(&MatrixParams::default()).await.unwrap();
    assert_eq!(fresh.count_for("pe", "steel"), Some(1));
}

// ═══════════════════════════════════════════════════════════════════════
// Ordering and filter catalog
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_dimension_ordering() {
    let store = Arc::new(MemoryStore::new());
    store
        .add_country("at", "Atlantis")
        .add_country("lu", "Luxembourg")
        .add_country("us", "United States")
        .add_country("cn", "China")
        .add_industry("wine", "Wine")
        .add_industry("banks", "Banks")
        .add_industry("steel", "Steel")
        .add_industry("misc", "Misc")
        .add_hierarchy("wine", "Agriculture", "Beverages")
        .add_hierarchy("banks", "Financials", "Banking")
        .add_hierarchy("steel", "Materials", "Metals");

    let matrix = service(&store).matrix(&MatrixParams::default()).await.unwrap();

    let countries: Vec<&str> = matrix.countries.iter().map(|c| c.id.as_str()).collect();
    // Population lifts China above the United States
    assert_eq!(countries, vec!["cn", "us", "lu", "at"]);
    assert_eq!(matrix.countries[1].display_name, "USA");
    assert_eq!(matrix.countries[3].display_name, "Atlantis");

    let industries: Vec<&str> = matrix.industries.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(industries, vec!["misc", "wine", "banks", "steel"]);
}

#[tokio::test]
async fn test_filter_catalog() {
    let store = Arc::new(MemoryStore::new());
    store
        .add_country("uk", "United Kingdom")
        .add_country("ar", "Argentina")
        .add_industry("steel", "Steel")
        .add_industry("banks", "Banks")
        .add_hierarchy("steel", "Materials", "Metals")
        .add_hierarchy("banks", "Financials", "Banking");

    let svc = service(&store);
    let filters = svc.filters().await.unwrap();

    // Countries keep store (name) order in the catalog
    let names: Vec<&str> = filters.countries.iter().map(|c| c.display_name.as_str()).collect();
    assert_eq!(names, vec!["Argentina", "UK"]);
    let industries: Vec<&str> = filters.industries.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(industries, vec!["banks", "steel"]);
    assert_eq!(filters.actor_subtypes, ActorSubtype::ALL);
    assert_eq!(filters.event_types.len(), 5);
    assert_eq!(filters.regulation_types.len(), 7);

    let again = svc.filters().await.unwrap();
    assert!(Arc::ptr_eq(&filters, &again));
}
