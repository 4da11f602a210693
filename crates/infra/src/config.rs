//! Runtime configuration, read from the environment with defaults.

use std::path::PathBuf;
use std::time::Duration;

pub const SNAPSHOT_PATH_ENV: &str = "RACKVIEW_SNAPSHOT_PATH";
pub const CACHE_TTL_ENV: &str = "RACKVIEW_CACHE_TTL_SECS";

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Where the last snapshot is persisted; `None` keeps it in memory only.
    pub snapshot_path: Option<PathBuf>,
    /// Default freshness window for client-side caches.
    pub cache_ttl: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl ReconcileConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults
    /// with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let snapshot_path = lookup(SNAPSHOT_PATH_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let cache_ttl = match lookup(CACHE_TTL_ENV) {
            None => DEFAULT_CACHE_TTL,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    tracing::warn!(
                        value = %raw,
                        default_secs = DEFAULT_CACHE_TTL.as_secs(),
                        "{CACHE_TTL_ENV} is not a whole number of seconds, using default"
                    );
                    DEFAULT_CACHE_TTL
                }
            },
        };

        Self {
            snapshot_path,
            cache_ttl,
        }
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(ReconcileConfig::from_lookup(lookup(&[])), ReconcileConfig::default());
    }

    #[test]
    fn reads_path_and_ttl() {
        let config = ReconcileConfig::from_lookup(lookup(&[
            (SNAPSHOT_PATH_ENV, "/var/lib/rackview/snapshot.json"),
            (CACHE_TTL_ENV, "1800"),
        ]));
        assert_eq!(
            config.snapshot_path,
            Some(PathBuf::from("/var/lib/rackview/snapshot.json"))
        );
        assert_eq!(config.cache_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn bad_ttl_and_blank_path_fall_back() {
        let config = ReconcileConfig::from_lookup(lookup(&[
            (SNAPSHOT_PATH_ENV, "  "),
            (CACHE_TTL_ENV, "soon"),
        ]));
        assert_eq!(config, ReconcileConfig::default());
    }
}
