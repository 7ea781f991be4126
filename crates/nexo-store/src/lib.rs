//! # nexo-store: Persistence Adapter for NEXOVENTIS
//!
//! Every read and write against the backing store goes through this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        NEXOVENTIS Data Flow                             │
//! │                                                                         │
//! │  HTTP handler → service (apps/server)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    nexo-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   Backend ── connect(config) picks one, once per process        │   │
//! │  │      │                                                          │   │
//! │  │      ├── store_for(session) → Arc<dyn Store>                    │   │
//! │  │      └── auth()             → &dyn AuthBackend                  │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────────┐      ┌──────────────────────────┐   │   │
//! │  │   │ local (SQLite, sqlx) │      │ remote (REST, reqwest)   │   │   │
//! │  │   │ SqlTable<E>          │      │ RemoteTable<E>           │   │   │
//! │  │   │ LocalAuth (argon2)   │      │ RemoteAuth (/auth/v1)    │   │   │
//! │  │   └──────────────────────┘      └──────────────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`table`] - `Entity`, `Table<E>` and `Store` contracts
//! - [`auth`] - `AuthBackend` contract
//! - [`local`] - SQLite fallback
//! - [`remote`] - hosted REST store
//! - [`fixtures`] - demo data for an empty store
//! - [`config`] - backend selection settings
//! - [`error`] - store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nexo_store::{connect, StoreConfig};
//!
//! let backend = connect(&StoreConfig::default()).await?;
//! let session = backend.auth().login(&credentials).await?;
//! let products = backend.store_for(&session).products().all().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod local;
pub mod remote;
pub mod table;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::AuthBackend;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use table::{BackendKind, Direction, Entity, Ordering, Store, Table};

use std::sync::Arc;

use tracing::{info, warn};

use nexo_core::AuthSession;

use crate::local::{Database, DbConfig, LocalAuth, LocalStore};
use crate::remote::{RemoteAuth, RemoteStore, RestClient};

// =============================================================================
// Backend
// =============================================================================

enum Inner {
    Local(Arc<LocalStore>),
    Remote(Arc<RestClient>),
}

/// The backing store chosen for this process.
pub struct Backend {
    inner: Inner,
    auth: Arc<dyn AuthBackend>,
}

impl Backend {
    /// Wraps an already opened local store.
    pub fn local(store: LocalStore, session_lifetime: chrono::Duration) -> Self {
        let auth = LocalAuth::new(store.database().pool().clone(), session_lifetime);
        Backend {
            inner: Inner::Local(Arc::new(store)),
            auth: Arc::new(auth),
        }
    }

    pub fn remote(client: RestClient, session_lifetime: chrono::Duration) -> Self {
        let client = Arc::new(client);
        Backend {
            auth: Arc::new(RemoteAuth::new(client.clone(), session_lifetime)),
            inner: Inner::Remote(client),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self.inner {
            Inner::Local(_) => BackendKind::Local,
            Inner::Remote(_) => BackendKind::Remote,
        }
    }

    pub fn auth(&self) -> &dyn AuthBackend {
        self.auth.as_ref()
    }

    /// Tables as seen by the session's user.
    pub fn store_for(&self, session: &AuthSession) -> Arc<dyn Store> {
        match &self.inner {
            Inner::Local(store) => store.clone() as Arc<dyn Store>,
            Inner::Remote(client) => {
                Arc::new(RemoteStore::new(client.clone(), Some(session.token.clone())))
            }
        }
    }

    /// Tables for work not tied to a user (startup tasks). The hosted store
    /// has no such access, so this is `None` there.
    pub fn system_store(&self) -> Option<Arc<dyn Store>> {
        match &self.inner {
            Inner::Local(store) => Some(store.clone() as Arc<dyn Store>),
            Inner::Remote(_) => None,
        }
    }

    /// Liveness of the backing store.
    pub async fn health_check(&self) -> bool {
        match &self.inner {
            Inner::Local(store) => store.database().health_check().await,
            Inner::Remote(client) => client.ping().await,
        }
    }
}

/// Selects and opens the backing store.
///
/// ```text
/// remote url + key configured? ──yes──► client builds? ──yes──► Remote
///          │                                  │
///          no                                 no (warn)
///          ▼                                  ▼
///        Local ◄──────────────────────────────┘
/// ```
pub async fn connect(config: &StoreConfig) -> StoreResult<Backend> {
    if let Some((url, key)) = config.remote() {
        match RestClient::new(url, key, config.remote_timeout()) {
            Ok(client) => {
                info!(url = %client.base_url(), "Using hosted store");
                return Ok(Backend::remote(client, config.session_lifetime()));
            }
            Err(e) => warn!(error = %e, "Hosted store unusable, falling back to local database"),
        }
    } else {
        info!("No hosted store configured, using local database");
    }

    let db_config = match &config.database_path {
        Some(path) => DbConfig::file(path).max_connections(config.max_connections),
        None => DbConfig::in_memory(),
    };
    let store = LocalStore::new(Database::new(db_config).await?);

    if config.seed_fixtures {
        fixtures::seed_if_empty(&store).await?;
    }

    Ok(Backend::local(store, config.session_lifetime()))
}
