//! # Report Commands

use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use nexo_core::report::{DailySummary, DashboardStats};
use nexo_core::Sale;

use crate::commands::{ok, ApiResponse};
use crate::error::ApiResult;
use crate::extract::{ApiQuery, Session};
use crate::services::reports;

/// `?date=YYYY-MM-DD`; today (UTC) when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

pub async fn dashboard(session: Session) -> ApiResult<Json<ApiResponse<DashboardStats>>> {
    Ok(ok(reports::dashboard(session.store.as_ref()).await?))
}

pub async fn daily(
    session: Session,
    ApiQuery(query): ApiQuery<DailyQuery>,
) -> ApiResult<Json<ApiResponse<DailySummary>>> {
    Ok(ok(reports::daily(session.store.as_ref(), query.date).await?))
}

pub async fn recent_sales(session: Session) -> ApiResult<Json<ApiResponse<Vec<Sale>>>> {
    Ok(ok(reports::recent(session.store.as_ref()).await?))
}
