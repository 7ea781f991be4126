//! # NEXOVENTIS Server
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info, nexo=debug; override with RUST_LOG                 │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults → config dir → nexoventis.toml / $NEXO_CONFIG → NEXO_*   │
//! │                                                                         │
//! │  3. Select Backing Store ─────────────────────────────────────────────► │
//! │     • hosted REST when url + key are set, local SQLite otherwise        │
//! │     • bootstrap admin (local), alert generator once                     │
//! │                                                                         │
//! │  4. Session sweep every 10 minutes (expired sessions, their carts) ───► │
//! │                                                                         │
//! │  5. Serve /api until Ctrl+C or SIGTERM ───────────────────────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nexo_server::services::auth::sweep_expired;
use nexo_server::{router, AppConfig, AppState, SharedState};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting NEXOVENTIS server");

    let config = AppConfig::load().context("failed to load configuration")?;
    info!(
        bind_addr = %config.bind_addr,
        store_name = %config.store_name,
        "Configuration loaded"
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::initialize(config)
        .await
        .context("failed to open the backing store")?;

    tokio::spawn(sweep_sessions(state.clone()));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=nexo=trace` - Show trace for nexo crates only
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nexo=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Drops expired sessions and the carts they left behind, forever.
async fn sweep_sessions(state: SharedState) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if let Err(e) = sweep_expired(&state).await {
            warn!(error = %e, "Session sweep failed");
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
