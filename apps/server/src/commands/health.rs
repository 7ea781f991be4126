//! # Health Command
//!
//! Public liveness check. Reports which backing store was selected at
//! startup and whether it currently answers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::commands::{ok, ApiResponse};
use crate::state::SharedState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `"ok"` when the backing store answers, `"degraded"` otherwise.
    pub status: &'static str,
    /// `"local"` or `"remote"`.
    pub backend: String,
    pub store_name: String,
    pub version: &'static str,
}

pub async fn health(State(state): State<SharedState>) -> Json<ApiResponse<HealthReport>> {
    debug!("health command");
    let healthy = state.backend.health_check().await;

    ok(HealthReport {
        status: if healthy { "ok" } else { "degraded" },
        backend: state.backend.kind().to_string(),
        store_name: state.config.store_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
