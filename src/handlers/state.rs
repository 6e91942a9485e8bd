//! Shared application state handed to every handler

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::coverage::CoverageService;
use crate::store::CoverageStore;

/// Process-wide state: the coverage service (which owns the response caches)
/// and the configuration it was built from.
pub struct CoverageState {
    service: CoverageService,
    config: ServerConfig,
    started_at: chrono::DateTime<chrono::Utc>,
}

impl CoverageState {
    pub fn new(store: Arc<dyn CoverageStore>, config: ServerConfig) -> Self {
        let service = CoverageService::new(store, &config.cache);
        Self {
            service,
            config,
            started_at: chrono::Utc::now(),
        }
    }

    pub fn service(&self) -> &CoverageService {
        &self.service
    }

    pub fn server_config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn uptime_seconds(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}
