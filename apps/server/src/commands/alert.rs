//! # Alert Commands

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::debug;

use nexo_core::Alert;

use crate::commands::{ok, ApiResponse};
use crate::error::ApiResult;
use crate::extract::{ApiPath, Session};
use crate::services::alerts::{self, AlertRefresh};
use crate::state::SharedState;

#[derive(Debug, Clone, Serialize)]
pub struct UnreadCount {
    pub unread: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkedRead {
    pub updated: usize,
}

pub async fn list_alerts(session: Session) -> ApiResult<Json<ApiResponse<Vec<Alert>>>> {
    Ok(ok(alerts::list(session.store.as_ref()).await?))
}

pub async fn unread_count(session: Session) -> ApiResult<Json<ApiResponse<UnreadCount>>> {
    let unread = alerts::unread_count(session.store.as_ref()).await?;
    Ok(ok(UnreadCount { unread }))
}

pub async fn mark_read(
    session: Session,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<Alert>>> {
    debug!(alert_id = %id, "mark_read command");
    Ok(ok(alerts::mark_read(session.store.as_ref(), session.user(), &id).await?))
}

pub async fn mark_all_read(session: Session) -> ApiResult<Json<ApiResponse<MarkedRead>>> {
    debug!("mark_all_read command");
    let updated = alerts::mark_all_read(session.store.as_ref(), session.user()).await?;
    Ok(ok(MarkedRead { updated }))
}

/// Runs the alert generator now.
pub async fn refresh(
    State(state): State<SharedState>,
    session: Session,
) -> ApiResult<Json<ApiResponse<AlertRefresh>>> {
    debug!("refresh_alerts command");
    let outcome = alerts::regenerate(&state, session.store.as_ref(), session.user()).await?;
    Ok(ok(outcome))
}
