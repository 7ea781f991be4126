//! # Server Configuration
//!
//! Layered configuration, later layers win:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults in code                                                    │
//! │  2. nexoventis.toml in the user config dir  (optional)                 │
//! │  3. ./nexoventis.toml or $NEXO_CONFIG       (optional)                 │
//! │  4. NEXO_* environment variables, `__` for nesting                      │
//! │        NEXO_BIND_ADDR=0.0.0.0:8080                                      │
//! │        NEXO_STORE__REMOTE_URL=https://xyz.example.co                    │
//! │        NEXO_STORE__REMOTE_KEY=...                                       │
//! │        NEXO_STORE__DATABASE_PATH=/var/lib/nexoventis/nexo.db            │
//! │        NEXO_AUTH__SESSION_HOURS=12                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;

use nexo_store::StoreConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "NEXO_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "nexoventis.toml";

/// Complete server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: String,

    /// Business name shown by the UI.
    pub store_name: String,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Lifetime of a login session.
    pub session_hours: i64,

    /// First admin account, created only while the local user table is empty.
    pub bootstrap_admin_email: String,
    pub bootstrap_admin_password: String,
    pub bootstrap_admin_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            session_hours: nexo_core::SESSION_LIFETIME_HOURS,
            bootstrap_admin_email: "admin@nexoventis.com".to_string(),
            bootstrap_admin_password: "admin123".to_string(),
            bootstrap_admin_name: "Administrador".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from files and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
        Self::load_from(explicit.as_deref())
    }

    /// Like [`AppConfig::load`], with `file` in place of the working
    /// directory lookup.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("bind_addr", "127.0.0.1:8080")?
            .set_default("store_name", "NEXOVENTIS")?;

        if let Some(dirs) = ProjectDirs::from("com", "nexoventis", "nexoventis") {
            let user_file = dirs.config_dir().join(DEFAULT_CONFIG_FILE);
            builder = builder.add_source(File::from(user_file).required(false));
        }

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let config = builder
            .add_source(
                Environment::with_prefix("NEXO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Store settings with the configured session lifetime applied.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            session_hours: self.auth.session_hours,
            ..self.store.clone()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: "127.0.0.1:8080".to_string(),
            store_name: "NEXOVENTIS".to_string(),
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
store_name = "Almacén Don Pedro"

[store]
database_path = "/tmp/nexo.db"
seed_fixtures = false

[auth]
session_hours = 8
"#
        )
        .unwrap();

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.store_name, "Almacén Don Pedro");
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.store.database_path, Some(PathBuf::from("/tmp/nexo.db")));
        assert!(!config.store.seed_fixtures);
        assert_eq!(config.auth.bootstrap_admin_email, "admin@nexoventis.com");

        let store = config.store_config();
        assert_eq!(store.session_hours, 8);
        assert!(store.remote().is_none());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(AppConfig::load_from(Some(Path::new("/nonexistent/nexoventis.toml"))).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.auth.session_hours, 24);
        assert!(config.store.database_path.is_none());
        assert!(config.store.seed_fixtures);
    }
}
