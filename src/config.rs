//! Configuration management for the coverage service
//!
//! Sensible defaults, overridable from the environment.

use std::env;
use std::time::Duration;
use tracing::info;

use crate::constants::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECS};
use crate::tracing_setup::LogFormat;

fn is_production_env() -> bool {
    env::var("COVERAGE_ENV")
        .map(|v| {
            let v = v.to_lowercase();
            v == "production" || v == "prod"
        })
        .unwrap_or(false)
}

fn parse_list(raw: &str, upper: bool) -> Vec<String> {
    raw.split(',')
        .map(|s| {
            let s = s.trim();
            if upper {
                s.to_uppercase()
            } else {
                s.to_string()
            }
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = allow all)
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache (seconds)
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: vec!["GET".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec!["Content-Type".to_string(), "X-Request-ID".to_string()],
            max_age_seconds: 86400,
        }
    }
}

impl CorsConfig {
    /// Load from environment variables. Warns when production runs with
    /// permissive origins.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = env::var("COVERAGE_CORS_ORIGINS") {
            config.allowed_origins = parse_list(&origins, false);
        }

        if let Ok(methods) = env::var("COVERAGE_CORS_METHODS") {
            config.allowed_methods = parse_list(&methods, true);
        }

        if let Ok(headers) = env::var("COVERAGE_CORS_HEADERS") {
            config.allowed_headers = parse_list(&headers, false);
        }

        if let Ok(val) = env::var("COVERAGE_CORS_MAX_AGE") {
            if let Ok(n) = val.parse() {
                config.max_age_seconds = n;
            }
        }

        if is_production_env() && config.allowed_origins.is_empty() {
            tracing::warn!(
                "PRODUCTION WARNING: CORS allows all origins. Set COVERAGE_CORS_ORIGINS to restrict."
            );
        }

        config
    }

    pub fn is_restricted(&self) -> bool {
        !self.allowed_origins.is_empty()
    }

    /// Convert to tower-http CorsLayer
    pub fn to_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let mut layer = CorsLayer::new();

        if self.allowed_origins.is_empty() {
            layer = layer.allow_origin(Any);
        } else {
            let mut valid_origins = Vec::new();
            for origin_str in &self.allowed_origins {
                match origin_str.parse::<axum::http::HeaderValue>() {
                    Ok(origin) => valid_origins.push(origin),
                    Err(_) => tracing::warn!("CORS: Invalid origin '{}' - skipping", origin_str),
                }
            }

            if valid_origins.is_empty() {
                // Misconfigured origins deny everything rather than fall open
                tracing::error!(
                    "CORS: All {} configured origin(s) failed to parse. \
                     Rejecting all cross-origin requests. Fix COVERAGE_CORS_ORIGINS.",
                    self.allowed_origins.len()
                );
            }
            layer = layer.allow_origin(AllowOrigin::list(valid_origins));
        }

        let methods: Vec<axum::http::Method> = self
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        layer = if methods.is_empty() {
            layer.allow_methods(Any)
        } else {
            layer.allow_methods(methods)
        };

        let headers: Vec<axum::http::HeaderName> = self
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        layer = if headers.is_empty() {
            layer.allow_headers(Any)
        } else {
            layer.allow_headers(headers)
        };

        layer.max_age(Duration::from_secs(self.max_age_seconds))
    }
}

/// Postgres connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection string; required by the server binary
    pub url: Option<String>,
    pub max_connections: u32,
    /// Require TLS (`sslmode=require`)
    pub require_ssl: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            require_ssl: false,
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Server configuration loaded from environment with defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1)
    pub host: String,

    /// Server port (default: 3040)
    pub port: u16,

    pub database: DatabaseConfig,

    pub cache: CacheConfig,

    /// Maximum concurrent requests (default: 100)
    pub max_concurrent_requests: usize,

    /// Requests exceeding this duration get 408 (default: 30)
    pub request_timeout_secs: u64,

    pub is_production: bool,

    pub cors: CorsConfig,

    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3040,
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            max_concurrent_requests: 100,
            request_timeout_secs: 30,
            is_production: false,
            cors: CorsConfig::default(),
            log_format: LogFormat::Text,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    #[allow(clippy::field_reassign_with_default)]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.is_production = is_production_env();

        if let Ok(val) = env::var("COVERAGE_HOST") {
            config.host = val;
        }

        if let Ok(val) = env::var("COVERAGE_PORT") {
            if let Ok(port) = val.parse() {
                config.port = port;
            }
        }

        // Database
        config.database.url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        if let Ok(val) = env::var("COVERAGE_DB_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse::<u32>() {
                config.database.max_connections = n.max(1);
            }
        }

        if let Ok(val) = env::var("COVERAGE_DB_SSL") {
            config.database.require_ssl = val.to_lowercase() == "true" || val == "1";
        } else if config.is_production {
            config.database.require_ssl = true;
        }

        // Cache
        if let Ok(val) = env::var("COVERAGE_CACHE_TTL_SECS") {
            if let Ok(n) = val.parse() {
                config.cache.ttl_secs = n;
            }
        }

        if let Ok(val) = env::var("COVERAGE_CACHE_MAX_ENTRIES") {
            if let Ok(n) = val.parse() {
                config.cache.max_entries = n;
            }
        }

        // Limits
        if let Ok(val) = env::var("COVERAGE_MAX_CONCURRENT") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_concurrent_requests = n.max(1);
            }
        }

        if let Ok(val) = env::var("COVERAGE_REQUEST_TIMEOUT") {
            if let Ok(n) = val.parse() {
                config.request_timeout_secs = n;
            }
        }

        config.cors = CorsConfig::from_env();

        config.log_format = LogFormat::from_env();

        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Log the current configuration. Never prints the database URL.
    pub fn log(&self) {
        info!("Configuration:");
        info!(
            "   Mode: {}",
            if self.is_production {
                "PRODUCTION"
            } else {
                "Development"
            }
        );
        info!("   Listen: {}:{}", self.host, self.port);
        info!(
            "   Database: {} (pool {}, tls {})",
            if self.database.url.is_some() {
                "configured"
            } else {
                "NOT SET"
            },
            self.database.max_connections,
            if self.database.require_ssl { "required" } else { "off" }
        );
        info!(
            "   Cache: ttl {}s, max {} entries",
            self.cache.ttl_secs, self.cache.max_entries
        );
        info!("   Max concurrent: {}", self.max_concurrent_requests);
        info!("   Request timeout: {}s", self.request_timeout_secs);
        if self.cors.is_restricted() {
            info!("   CORS origins: {:?}", self.cors.allowed_origins);
        } else {
            info!("   CORS: Permissive (all origins allowed)");
        }
    }
}

/// Environment variable documentation
pub fn print_env_help() {
    println!("Coverage Matrix Configuration Environment Variables:");
    println!();
    println!("  COVERAGE_ENV                - Set to 'production' or 'prod' for production mode");
    println!("  COVERAGE_HOST               - Bind address (default: 127.0.0.1, use 0.0.0.0 for Docker)");
    println!("  COVERAGE_PORT               - Server port (default: 3040)");
    println!("  COVERAGE_MAX_CONCURRENT     - Max concurrent requests (default: 100)");
    println!("  COVERAGE_REQUEST_TIMEOUT    - Request timeout in seconds (default: 30)");
    println!();
    println!("Database:");
    println!("  DATABASE_URL                - Postgres connection string (required)");
    println!("  COVERAGE_DB_MAX_CONNECTIONS - Pool size (default: 5)");
    println!("  COVERAGE_DB_SSL             - Require TLS true/false (default: true in production)");
    println!();
    println!("Cache:");
    println!("  COVERAGE_CACHE_TTL_SECS     - Response cache TTL in seconds (default: 300)");
    println!("  COVERAGE_CACHE_MAX_ENTRIES  - Max cached responses (default: 1024)");
    println!();
    println!("CORS Configuration:");
    println!("  COVERAGE_CORS_ORIGINS       - Comma-separated allowed origins (default: all)");
    println!("  COVERAGE_CORS_METHODS       - Comma-separated allowed methods (default: GET,OPTIONS)");
    println!("  COVERAGE_CORS_HEADERS       - Comma-separated allowed headers (default: Content-Type,X-Request-ID)");
    println!("  COVERAGE_CORS_MAX_AGE       - Preflight cache seconds (default: 86400)");
    println!();
    println!("  RUST_LOG                    - Log level (e.g., info, debug, coverage_matrix=trace)");
    println!("  COVERAGE_LOG_FORMAT         - 'text' (default) or 'json'");
    println!();
}
