//! Aggregation query builder
//!
//! Turns a validated [`MatrixParams`] into an [`AggregationRequest`]: the
//! resolved filter sets plus which dimensions must be computed. The request is
//! store-agnostic; [`AggregationRequest::to_sql`] renders it as a prepared
//! Postgres statement whose filter values are bound as text arrays, never
//! spliced into the query text.
//!
//! Filters only ever narrow. An empty selection means "every member of the
//! enum", not "nothing".

use serde::Serialize;

use super::types::{ActorSubtype, CoverageMode, EventType, MatrixParams, RegulationType};

/// One sparse aggregation row: a (country, industry) pair with at least one
/// matching content item in a computed dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationRow {
    pub country_id: String,
    pub industry_id: String,
    pub count: u64,
    pub actor_sum: Option<u64>,
    pub event_sum: Option<u64>,
    pub regulation_sum: Option<u64>,
}

/// Resolved, store-agnostic aggregation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub mode: CoverageMode,
    pub actor_subtypes: Vec<ActorSubtype>,
    pub event_types: Vec<EventType>,
    pub regulation_types: Vec<RegulationType>,
    pub include_breakdown: bool,
}

/// Empty selects all; otherwise sorted and deduplicated
fn resolve<T: Copy + Ord>(selected: &[T], all: &[T]) -> Vec<T> {
    let mut out = if selected.is_empty() {
        all.to_vec()
    } else {
        selected.to_vec()
    };
    out.sort_unstable();
    out.dedup();
    out
}

/// A prepared statement: query text plus one text-array bind per placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub text: String,
    pub binds: Vec<Vec<String>>,
}

impl SqlStatement {
    fn bind(&mut self, values: Vec<String>) -> String {
        self.binds.push(values);
        format!("${}", self.binds.len())
    }
}

impl AggregationRequest {
    pub fn from_params(params: &MatrixParams) -> Self {
        Self {
            mode: params.mode,
            actor_subtypes: resolve(&params.actor_subtypes, ActorSubtype::ALL),
            event_types: resolve(&params.event_types, EventType::ALL),
            regulation_types: resolve(&params.regulation_types, RegulationType::ALL),
            include_breakdown: params.include_breakdown,
        }
    }

    pub fn computes_actors(&self) -> bool {
        self.mode.includes_actors() || self.include_breakdown
    }

    pub fn computes_events(&self) -> bool {
        self.mode.includes_events() || self.include_breakdown
    }

    pub fn computes_regulations(&self) -> bool {
        self.mode.includes_regulations() || self.include_breakdown
    }

    pub fn accepts_actor(&self, subtype: ActorSubtype) -> bool {
        self.actor_subtypes.contains(&subtype)
    }

    pub fn accepts_event(&self, event_type: EventType) -> bool {
        self.event_types.contains(&event_type)
    }

    pub fn accepts_regulation(&self, regulation_type: RegulationType) -> bool {
        self.regulation_types.contains(&regulation_type)
    }

    /// Primary count for this mode given the three distinct sub-counts
    pub fn primary_count(&self, actors: u64, events: u64, regulations: u64) -> u64 {
        match self.mode {
            CoverageMode::Actors => actors,
            CoverageMode::Events => events,
            CoverageMode::Regulations => regulations,
            CoverageMode::Total => actors + events + regulations,
        }
    }

    /// Assemble a sparse row from sub-counts, or `None` if the pair has no
    /// matching item in any computed dimension.
    pub fn make_row(
        &self,
        country_id: &str,
        industry_id: &str,
        actors: u64,
        events: u64,
        regulations: u64,
    ) -> Option<AggregationRow> {
        let count = self.primary_count(actors, events, regulations);
        let keep = if self.include_breakdown {
            actors + events + regulations > 0
        } else {
            count > 0
        };
        keep.then(|| AggregationRow {
            country_id: country_id.to_string(),
            industry_id: industry_id.to_string(),
            count,
            actor_sum: self.include_breakdown.then_some(actors),
            event_sum: self.include_breakdown.then_some(events),
            regulation_sum: self.include_breakdown.then_some(regulations),
        })
    }

    /// Render as a parameterized Postgres statement.
    ///
    /// Only static fragments chosen by `mode` / `include_breakdown` are
    /// concatenated; every filter value travels as a bound `text[]`.
    pub fn to_sql(&self) -> SqlStatement {
        let mut stmt = SqlStatement {
            text: String::new(),
            binds: Vec::new(),
        };
        let mut ctes: Vec<String> = Vec::new();
        let mut parts: Vec<&str> = Vec::new();

        if self.computes_actors() {
            let values = self
                .actor_subtypes
                .iter()
                .map(|s| s.stored_value().to_string())
                .collect();
            let p = stmt.bind(values);
            ctes.push(format!(
                r#"actor_agg AS (
    SELECT
        ce.published_country_id::text AS country_id,
        be.published_brief_id::text AS industry_id,
        COUNT(DISTINCT pe.id) AS actor_count
    FROM "publishedEvents" e
    JOIN pub_countries_events ce ON ce.published_event_id = e.id
    JOIN pub_briefs_events be ON be.published_event_id = e.id
    JOIN "pubEventsEntities" pee ON pee."publishedEventId" = e.id
    JOIN "publishedEntities" pe ON pe.id = pee."publishedEntityId"
    WHERE pe.entity ->> 'subType' = ANY({p})
    GROUP BY 1, 2
)"#
            ));
            parts.push(
                "SELECT country_id, industry_id, actor_count, 0::bigint AS event_count, 0::bigint AS reg_count FROM actor_agg",
            );
        }

        if self.computes_events() {
            let values = self
                .event_types
                .iter()
                .map(|t| t.stored_value().to_string())
                .collect();
            let p = stmt.bind(values);
            ctes.push(format!(
                r#"content_links AS (
    SELECT e.id::text AS content_id, 'event' AS content_type,
        ce.published_country_id::text AS country_id, be.published_brief_id::text AS industry_id
    FROM "publishedEvents" e
    JOIN pub_countries_events ce ON ce.published_event_id = e.id
    JOIN pub_briefs_events be ON be.published_event_id = e.id
    UNION ALL
    SELECT q.id::text, 'quote', qc.country_id::text, qi.industry_id::text
    FROM quotes q
    JOIN quote_country qc ON qc.quote_id = q.id
    JOIN quote_industry qi ON qi.quote_id = q.id
    UNION ALL
    SELECT a.id::text, 'appointment', pce.published_country_id::text, ai.industry_id::text
    FROM appointment a
    JOIN appointment_industry ai ON ai.appointment_id = a.id
    JOIN pub_countries_events pce ON pce.published_event_id = a.published_event_id
    UNION ALL
    SELECT c.id::text, 'conference', c.published_country_id::text, ci.industry_id::text
    FROM conference c
    JOIN conference_industry ci ON ci.conference_id = c.id
    WHERE c.published_country_id IS NOT NULL
    UNION ALL
    SELECT p.id::text, 'post', p.published_country_id::text, pi.industry_id::text
    FROM post p
    JOIN post_industry pi ON pi.post_id = p.id
    WHERE p.published_country_id IS NOT NULL
),
content_agg AS (
    SELECT country_id, industry_id,
        COUNT(DISTINCT content_type || ':' || content_id) AS event_count
    FROM content_links
    WHERE content_type = ANY({p})
    GROUP BY country_id, industry_id
)"#
            ));
            parts.push(
                "SELECT country_id, industry_id, 0::bigint AS actor_count, event_count, 0::bigint AS reg_count FROM content_agg",
            );
        }

        if self.computes_regulations() {
            let values = self
                .regulation_types
                .iter()
                .map(|t| t.stored_value().to_string())
                .collect();
            let p = stmt.bind(values);
            ctes.push(format!(
                r#"reg_agg AS (
    SELECT
        r.published_country_id::text AS country_id,
        rb.published_brief_id::text AS industry_id,
        COUNT(DISTINCT r.id) AS reg_count
    FROM published_regulations r
    JOIN pub_briefs_regulations rb ON rb.published_regulation_id = r.id
    WHERE r.published_country_id IS NOT NULL
      AND r.type = ANY({p})
    GROUP BY 1, 2
)"#
            ));
            parts.push(
                "SELECT country_id, industry_id, 0::bigint AS actor_count, 0::bigint AS event_count, reg_count FROM reg_agg",
            );
        }

        let count_expr = match self.mode {
            CoverageMode::Actors => "SUM(actor_count)",
            CoverageMode::Events => "SUM(event_count)",
            CoverageMode::Regulations => "SUM(reg_count)",
            CoverageMode::Total => "SUM(actor_count) + SUM(event_count) + SUM(reg_count)",
        };

        let breakdown_cols = if self.include_breakdown {
            "SUM(actor_count)::bigint AS actor_sum,
    SUM(event_count)::bigint AS event_sum,
    SUM(reg_count)::bigint AS regulation_sum"
        } else {
            "NULL::bigint AS actor_sum,
    NULL::bigint AS event_sum,
    NULL::bigint AS regulation_sum"
        };

        let having = if self.include_breakdown {
            String::new()
        } else {
            format!("\nHAVING {count_expr} > 0")
        };

        stmt.text = format!(
            "WITH\n{ctes},\ncombined AS (\n    {union}\n)\nSELECT\n    country_id,\n    industry_id,\n    ({count_expr})::bigint AS count,\n    {breakdown_cols}\nFROM combined\nGROUP BY country_id, industry_id{having}\nORDER BY country_id, industry_id",
            ctes = ctes.join(",\n"),
            union = parts.join("\n    UNION ALL\n    "),
        );
        stmt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_select_everything() {
        let req = AggregationRequest::from_params(&MatrixParams::new(CoverageMode::Total));
        assert_eq!(req.actor_subtypes.len(), 4);
        assert_eq!(req.event_types.len(), 5);
        assert_eq!(req.regulation_types.len(), 7);

        let explicit = AggregationRequest::from_params(
            &MatrixParams::new(CoverageMode::Total).with_actor_subtypes(ActorSubtype::ALL),
        );
        assert_eq!(req, explicit);
    }

    #[test]
    fn test_filters_are_sorted_and_deduplicated() {
        let req = AggregationRequest::from_params(
            &MatrixParams::new(CoverageMode::Events).with_event_types([
                EventType::Post,
                EventType::Event,
                EventType::Post,
            ]),
        );
        assert_eq!(req.event_types, vec![EventType::Event, EventType::Post]);
    }

    #[test]
    fn test_primary_count_per_mode() {
        let mut req = AggregationRequest::from_params(&MatrixParams::new(CoverageMode::Actors));
        assert_eq!(req.primary_count(2, 3, 5), 2);
        req.mode = CoverageMode::Events;
        assert_eq!(req.primary_count(2, 3, 5), 3);
        req.mode = CoverageMode::Regulations;
        assert_eq!(req.primary_count(2, 3, 5), 5);
        req.mode = CoverageMode::Total;
        assert_eq!(req.primary_count(2, 3, 5), 10);
    }

    #[test]
    fn test_make_row_keeps_breakdown_only_pairs() {
        let plain = AggregationRequest::from_params(&MatrixParams::new(CoverageMode::Actors));
        assert!(plain.make_row("c", "i", 0, 4, 0).is_none());

        let with_breakdown = AggregationRequest::from_params(
            &MatrixParams::new(CoverageMode::Actors).with_breakdown(),
        );
        let row = with_breakdown.make_row("c", "i", 0, 4, 0).unwrap();
        assert_eq!(row.count, 0);
        assert_eq!(row.event_sum, Some(4));
        assert_eq!(row.actor_sum, Some(0));
    }

    #[test]
    fn test_sql_single_dimension_binds_one_array() {
        let req = AggregationRequest::from_params(
            &MatrixParams::new(CoverageMode::Regulations)
                .with_regulation_types([RegulationType::PolicyDocs]),
        );
        let stmt = req.to_sql();
        assert_eq!(
            stmt.binds,
            vec![vec!["Policy Documents and Advisory Opinions".to_string()]]
        );
        assert!(stmt.text.contains("r.type = ANY($1)"));
        assert!(!stmt.text.contains("actor_agg"));
        assert!(!stmt.text.contains("content_agg"));
        assert!(stmt.text.contains("HAVING SUM(reg_count) > 0"));
        assert!(!stmt.text.contains("Policy Documents"));
    }

    #[test]
    fn test_sql_breakdown_computes_all_dimensions() {
        let req = AggregationRequest::from_params(
            &MatrixParams::new(CoverageMode::Events).with_breakdown(),
        );
        let stmt = req.to_sql();
        assert_eq!(stmt.binds.len(), 3);
        assert!(stmt.text.contains("pe.entity ->> 'subType' = ANY($1)"));
        assert!(stmt.text.contains("content_type = ANY($2)"));
        assert!(stmt.text.contains("r.type = ANY($3)"));
        assert!(stmt.text.contains("(SUM(event_count))::bigint AS count"));
        assert!(stmt.text.contains("SUM(actor_count)::bigint AS actor_sum"));
        assert!(!stmt.text.contains("HAVING"));
        assert_eq!(
            stmt.binds[0],
            vec!["Person", "Company", "GovernmentBody", "Organization"]
        );
    }

    #[test]
    fn test_sql_total_sums_three_dimensions() {
        let stmt = AggregationRequest::from_params(&MatrixParams::default()).to_sql();
        assert!(stmt
            .text
            .contains("(SUM(actor_count) + SUM(event_count) + SUM(reg_count))::bigint AS count"));
        assert!(stmt.text.contains("NULL::bigint AS actor_sum"));
    }
}
