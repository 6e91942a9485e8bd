//! Type definitions for the coverage engine
//!
//! Wire spellings follow the dashboard's JSON contract: camelCase field names,
//! `veryLow`-style levels and snake_case filter tokens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// DIMENSIONS
// =============================================================================

/// Country reference entity. `display_name` is a cosmetic shortening of `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

/// Industry reference entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub id: String,
    pub name: String,
}

/// Country row as read from the store (before display-name resolution)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRecord {
    pub id: String,
    pub name: String,
}

/// Sector / sub-sector placement of an industry, used only for ordering.
///
/// Missing levels are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndustryHierarchy {
    pub industry_id: String,
    pub subsector_name: String,
    pub sector_name: String,
}

// =============================================================================
// MODES & LEVELS
// =============================================================================

/// Which content dimension(s) feed the primary `count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageMode {
    Actors,
    Events,
    Regulations,
    #[default]
    Total,
}

impl CoverageMode {
    pub const ALL: [CoverageMode; 4] = [
        CoverageMode::Actors,
        CoverageMode::Events,
        CoverageMode::Regulations,
        CoverageMode::Total,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actors => "actors",
            Self::Events => "events",
            Self::Regulations => "regulations",
            Self::Total => "total",
        }
    }

    pub fn includes_actors(&self) -> bool {
        matches!(self, Self::Actors | Self::Total)
    }

    pub fn includes_events(&self) -> bool {
        matches!(self, Self::Events | Self::Total)
    }

    pub fn includes_regulations(&self) -> bool {
        matches!(self, Self::Regulations | Self::Total)
    }
}

impl fmt::Display for CoverageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected `mode` query value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid mode. Must be one of: actors, events, regulations, total")]
pub struct InvalidModeError;

impl FromStr for CoverageMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or(InvalidModeError)
    }
}

/// Ordinal coverage level. Declaration order is the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoverageLevel {
    None,
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl CoverageLevel {
    pub const ALL: [CoverageLevel; 6] = [
        CoverageLevel::None,
        CoverageLevel::VeryLow,
        CoverageLevel::Low,
        CoverageLevel::Medium,
        CoverageLevel::High,
        CoverageLevel::VeryHigh,
    ];

    /// Human-readable legend label
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }

    /// Legend swatch color
    pub fn color(&self) -> &'static str {
        match self {
            Self::None => "#f3f4f6",
            Self::VeryLow => "#fee2e2",
            Self::Low => "#fecaca",
            Self::Medium => "#fcd34d",
            Self::High => "#86efac",
            Self::VeryHigh => "#22c55e",
        }
    }
}

// =============================================================================
// FILTER ENUMS
// =============================================================================

/// Declares a filter token enum with its wire token, store value and label.
macro_rules! filter_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($token:literal, $stored:literal, $label:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $token)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Token used in query strings and JSON
            pub fn as_str(&self) -> &'static str {
                match self { $(Self::$variant => $token),+ }
            }

            /// Value as stored in the content database
            pub fn stored_value(&self) -> &'static str {
                match self { $(Self::$variant => $stored),+ }
            }

            /// Display label for filter pickers
            pub fn label(&self) -> &'static str {
                match self { $(Self::$variant => $label),+ }
            }

            /// Parse a wire token; unknown tokens yield `None`
            pub fn parse(token: &str) -> Option<Self> {
                match token { $($token => Some(Self::$variant),)+ _ => None }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

filter_enum! {
    /// Actor entity subtype
    ActorSubtype {
        Person => ("person", "Person", "Person"),
        Company => ("company", "Company", "Company"),
        GovBody => ("gov_body", "GovernmentBody", "Government Body"),
        Org => ("org", "Organization", "Organization"),
    }
}

filter_enum! {
    /// Event-like content type
    EventType {
        Event => ("event", "event", "Event"),
        Quote => ("quote", "quote", "Quote"),
        Appointment => ("appointment", "appointment", "Appointment"),
        Conference => ("conference", "conference", "Conference"),
        Post => ("post", "post", "Post"),
    }
}

filter_enum! {
    /// Regulation document category
    RegulationType {
        LegislativeActs => ("legislative_acts", "Legislative Acts", "Legislative Acts"),
        RegulatoryInstruments => ("regulatory_instruments", "Regulatory Instruments", "Regulatory Instruments"),
        PolicyDocs => ("policy_docs", "Policy Documents and Advisory Opinions", "Policy Documents"),
        DecisionsOrders => ("decisions_orders", "Decisions and Orders", "Decisions & Orders"),
        InternationalAgreements => ("international_agreements", "International and Interinstitutional Agreements", "International Agreements"),
        OtherDocs => ("other_docs", "Other Documents", "Other Documents"),
        PublicConsultations => ("public_consultations", "Public Consultations", "Public Consultations"),
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// Parameters of one matrix request, already validated at the boundary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixParams {
    pub mode: CoverageMode,
    pub actor_subtypes: Vec<ActorSubtype>,
    pub event_types: Vec<EventType>,
    pub regulation_types: Vec<RegulationType>,
    pub include_breakdown: bool,
}

impl MatrixParams {
    pub fn new(mode: CoverageMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_breakdown(mut self) -> Self {
        self.include_breakdown = true;
        self
    }

    pub fn with_actor_subtypes(mut self, subtypes: impl Into<Vec<ActorSubtype>>) -> Self {
        self.actor_subtypes = subtypes.into();
        self
    }

    pub fn with_event_types(mut self, types: impl Into<Vec<EventType>>) -> Self {
        self.event_types = types.into();
        self
    }

    pub fn with_regulation_types(mut self, types: impl Into<Vec<RegulationType>>) -> Self {
        self.regulation_types = types.into();
        self
    }
}

/// Display percentiles of strictly positive raw counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageThresholds {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

/// Per-dimension sub-counts, same layout as `counts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageBreakdown {
    pub actor_counts: Vec<u64>,
    pub event_counts: Vec<u64>,
    pub regulation_counts: Vec<u64>,
}

/// Fully assembled matrix, row-major by country then industry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageMatrixResponse {
    pub countries: Vec<Country>,
    pub industries: Vec<Industry>,
    pub counts: Vec<u64>,
    pub levels: Vec<CoverageLevel>,
    pub thresholds: CoverageThresholds,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub breakdown: Option<CoverageBreakdown>,
}

impl CoverageMatrixResponse {
    /// Flat index of a cell
    pub fn index(&self, country_idx: usize, industry_idx: usize) -> usize {
        country_idx * self.industries.len() + industry_idx
    }

    /// Raw count of a cell by ids, if both ids are in the matrix
    pub fn count_for(&self, country_id: &str, industry_id: &str) -> Option<u64> {
        let c = self.countries.iter().position(|c| c.id == country_id)?;
        let i = self.industries.iter().position(|i| i.id == industry_id)?;
        self.counts.get(self.index(c, i)).copied()
    }

    /// Level of a cell by ids, if both ids are in the matrix
    pub fn level_for(&self, country_id: &str, industry_id: &str) -> Option<CoverageLevel> {
        let c = self.countries.iter().position(|c| c.id == country_id)?;
        let i = self.industries.iter().position(|i| i.id == industry_id)?;
        self.levels.get(self.index(c, i)).copied()
    }
}

/// Static filter option catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageFilters {
    pub countries: Vec<Country>,
    pub industries: Vec<Industry>,
    pub actor_subtypes: Vec<ActorSubtype>,
    pub event_types: Vec<EventType>,
    pub regulation_types: Vec<RegulationType>,
}

/// One legend row
#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub level: CoverageLevel,
    pub label: &'static str,
    pub color: &'static str,
}
