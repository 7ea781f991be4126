//! # Auth Commands
//!
//! ```text
//! POST /api/auth/login     { email, password }  → AuthSession  (public)
//! POST /api/auth/logout                         → null
//! GET  /api/auth/session                        → AuthSession
//! POST /api/auth/register  RegisterData         → User         (admin)
//! ```
//!
//! The client keeps `AuthSession.token` and sends it back as
//! `Authorization: Bearer <token>`.

use axum::extract::State;
use axum::Json;
use tracing::debug;

use nexo_core::{AuthSession, LoginCredentials, RegisterData, User};

use crate::commands::{ok, ApiResponse};
use crate::error::ApiResult;
use crate::extract::{ApiJson, Session};
use crate::services::auth as service;
use crate::state::SharedState;

pub async fn login(
    State(state): State<SharedState>,
    ApiJson(credentials): ApiJson<LoginCredentials>,
) -> ApiResult<Json<ApiResponse<AuthSession>>> {
    debug!(email = %credentials.email, "login command");
    Ok(ok(service::login(&state, credentials).await?))
}

pub async fn logout(
    State(state): State<SharedState>,
    session: Session,
) -> ApiResult<Json<ApiResponse<()>>> {
    debug!("logout command");
    service::logout(&state, session.token()).await?;
    Ok(ok(()))
}

pub async fn session(session: Session) -> Json<ApiResponse<AuthSession>> {
    ok(session.session)
}

pub async fn register(
    State(state): State<SharedState>,
    session: Session,
    ApiJson(data): ApiJson<RegisterData>,
) -> ApiResult<Json<ApiResponse<User>>> {
    debug!(email = %data.email, "register command");
    Ok(ok(service::register(&state, &session.session, data).await?))
}
