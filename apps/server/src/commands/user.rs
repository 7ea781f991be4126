//! # User Commands
//!
//! Admin only. Registration lives in `auth.rs`.

use axum::Json;
use serde::Deserialize;
use tracing::debug;

use nexo_core::User;

use crate::commands::{ok, ApiResponse};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, Session};
use crate::services::users;

#[derive(Debug, Clone, Deserialize)]
pub struct SetActive {
    pub is_active: bool,
}

pub async fn list_users(session: Session) -> ApiResult<Json<ApiResponse<Vec<User>>>> {
    Ok(ok(users::list_users(session.store.as_ref(), session.user()).await?))
}

pub async fn set_user_active(
    session: Session,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<SetActive>,
) -> ApiResult<Json<ApiResponse<User>>> {
    debug!(user_id = %id, is_active = body.is_active, "set_user_active command");
    let user =
        users::set_user_active(session.store.as_ref(), session.user(), &id, body.is_active)
            .await?;
    Ok(ok(user))
}
