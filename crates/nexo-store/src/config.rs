//! Store selection settings.
//!
//! Built by the server from its layered configuration; tests construct it
//! directly.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Which backing store to use and how to reach it.
///
/// The remote store is selected only when both `remote_url` and
/// `remote_key` are present.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the hosted store (e.g. `https://xyz.example.co`).
    pub remote_url: Option<String>,
    /// Public API key sent as the `apikey` header.
    pub remote_key: Option<String>,
    /// Per-request timeout for the hosted store.
    pub remote_timeout_secs: u64,

    /// SQLite file for the local fallback. `None` keeps the data in memory
    /// for the lifetime of the process.
    pub database_path: Option<PathBuf>,
    pub max_connections: u32,
    /// Insert demo data into an empty local store.
    pub seed_fixtures: bool,

    /// Lifetime of a login session.
    pub session_hours: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            remote_url: None,
            remote_key: None,
            remote_timeout_secs: 15,
            database_path: None,
            max_connections: 5,
            seed_fixtures: true,
            session_hours: nexo_core::SESSION_LIFETIME_HOURS,
        }
    }
}

impl StoreConfig {
    /// In-memory local store without fixtures.
    pub fn in_memory() -> Self {
        StoreConfig {
            seed_fixtures: false,
            ..Default::default()
        }
    }

    /// Hosted store settings, when both halves are configured and non-empty.
    pub fn remote(&self) -> Option<(&str, &str)> {
        let url = self.remote_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let key = self.remote_key.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((url, key))
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    pub fn session_lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_requires_both_url_and_key() {
        let mut config = StoreConfig::default();
        assert!(config.remote().is_none());

        config.remote_url = Some("https://store.example.com".to_string());
        assert!(config.remote().is_none());

        config.remote_key = Some("  ".to_string());
        assert!(config.remote().is_none());

        config.remote_key = Some("anon-key".to_string());
        assert_eq!(
            config.remote(),
            Some(("https://store.example.com", "anon-key"))
        );
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(config.seed_fixtures);
        assert!(config.database_path.is_none());
        assert_eq!(config.session_hours, 24);
        assert!(!StoreConfig::in_memory().seed_fixtures);
    }
}
