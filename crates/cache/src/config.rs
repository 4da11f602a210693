use std::time::Duration;

use rackview_infra::ReconcileConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Freshness window used when a read does not pass its own.
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: rackview_infra::config::DEFAULT_CACHE_TTL,
        }
    }
}

impl CacheConfig {
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

impl From<&ReconcileConfig> for CacheConfig {
    fn from(config: &ReconcileConfig) -> Self {
        Self {
            default_ttl: config.cache_ttl,
        }
    }
}
