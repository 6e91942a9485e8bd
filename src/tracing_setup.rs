//! Log subscriber setup
//!
//! `RUST_LOG` controls the filter (default `info`). `COVERAGE_LOG_FORMAT=json`
//! switches to one JSON object per line for log shippers.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Read `COVERAGE_LOG_FORMAT`; unset means text
    pub fn from_env() -> Self {
        std::env::var("COVERAGE_LOG_FORMAT")
            .map(|v| Self::from_env_value(&v))
            .unwrap_or_default()
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?,
    }

    tracing::debug!(?format, "Tracing initialized");
    Ok(())
}
