//! # Application State
//!
//! Everything the HTTP commands share, passed to handlers explicitly via
//! axum's `State` extractor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         AppState (Arc)                                  │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │    Backend       │ │   CartRegistry   │ │    AppConfig         │   │
//! │  │                  │ │                  │ │                      │   │
//! │  │  • store_for()   │ │  • cart / token  │ │  • store name        │   │
//! │  │  • auth()        │ │  • Mutex<HashMap>│ │  • bind address      │   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! │                                                                         │
//! │  + alert_lock: serializes generator runs inside this process           │
//! │  + ledger_lock: serializes stock and debt read-modify-writes          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use nexo_store::{connect, Backend, BackendKind, StoreResult};

use crate::config::AppConfig;
use crate::services;

pub use cart::CartRegistry;

/// Shared state handed to every handler.
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub backend: Backend,
    pub carts: CartRegistry,
    pub config: AppConfig,
    pub alert_lock: Mutex<()>,
    /// Held by every read-modify-write of product stock or customer debt
    /// (checkout, stock adjustment, product/customer update, payment).
    pub ledger_lock: Mutex<()>,
}

impl AppState {
    pub fn new(backend: Backend, config: AppConfig) -> Self {
        AppState {
            backend,
            carts: CartRegistry::new(),
            config,
            alert_lock: Mutex::new(()),
            ledger_lock: Mutex::new(()),
        }
    }

    /// Opens the backing store and runs the startup tasks.
    ///
    /// ## Startup Sequence
    /// ```text
    /// connect() ──► bootstrap admin (local only) ──► alert generator once
    /// ```
    ///
    /// The hosted store only accepts user-scoped calls, so there the first
    /// generator run happens at the first login instead.
    pub async fn initialize(config: AppConfig) -> StoreResult<SharedState> {
        let backend = connect(&config.store_config()).await?;
        info!(backend = %backend.kind(), "Backing store selected");

        if backend.kind() == BackendKind::Local {
            let auth = &config.auth;
            let created = backend
                .auth()
                .bootstrap_admin(
                    &auth.bootstrap_admin_email,
                    &auth.bootstrap_admin_password,
                    &auth.bootstrap_admin_name,
                )
                .await?;
            if created {
                info!(email = %auth.bootstrap_admin_email, "Bootstrap admin created");
            }
        }

        let state = Arc::new(AppState::new(backend, config));

        match state.backend.system_store() {
            Some(store) => {
                if let Err(e) = services::alerts::refresh(&state, store.as_ref()).await {
                    warn!(error = %e, "Startup alert generation failed");
                }
            }
            None => warn!("Hosted store has no system access; alerts are generated at login"),
        }

        Ok(state)
    }
}
