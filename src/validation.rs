//! Query-string validation at the HTTP boundary
//!
//! Only `mode` is strict. Filter lists are lenient: unknown tokens are dropped
//! so a stale dashboard link still renders with whatever filters remain valid.

use serde::Deserialize;

use crate::coverage::types::{
    ActorSubtype, CoverageMode, EventType, InvalidModeError, MatrixParams, RegulationType,
};

/// Raw matrix query parameters as they arrive on the URL
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixQuery {
    pub mode: Option<String>,
    pub actor_subtypes: Option<String>,
    pub event_types: Option<String>,
    pub regulation_types: Option<String>,
    pub include_breakdown: Option<String>,
}

/// Absent or empty mode means `total`; anything else must be an exact token
pub fn parse_mode(raw: Option<&str>) -> Result<CoverageMode, InvalidModeError> {
    match raw {
        None | Some("") => Ok(CoverageMode::default()),
        Some(value) => value.parse(),
    }
}

/// Comma-separated tokens; blanks and unknown tokens are dropped
pub fn parse_list<T>(raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(&parse)
            .collect()
    })
    .unwrap_or_default()
}

/// Only the literal `true` enables the breakdown
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}

impl MatrixQuery {
    pub fn into_params(self) -> Result<MatrixParams, InvalidModeError> {
        Ok(MatrixParams {
            mode: parse_mode(self.mode.as_deref())?,
            actor_subtypes: parse_list(self.actor_subtypes.as_deref(), ActorSubtype::parse),
            event_types: parse_list(self.event_types.as_deref(), EventType::parse),
            regulation_types: parse_list(
                self.regulation_types.as_deref(),
                RegulationType::parse,
            ),
            include_breakdown: parse_flag(self.include_breakdown.as_deref()),
        })
    }
}
