//! # Request Extractors
//!
//! Wrappers around axum's extractors so that every rejection leaves the
//! server inside the failure envelope instead of axum's plain-text bodies.
//!
//! ```text
//! Authorization: Bearer <token>
//!        │
//!        ▼
//! AuthBackend::session(token) ──None──► drop its cart, 401 UNAUTHORIZED
//!        │
//!        ▼
//! Session { session, store: backend.store_for(&session) }
//! ```

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use nexo_core::{AuthSession, User};
use nexo_store::Store;

use crate::error::ApiError;
use crate::state::SharedState;

/// `axum::Json` with envelope rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with envelope rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `axum::extract::Path` with envelope rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// The caller's live session and the tables as seen by its user.
pub struct Session {
    pub session: AuthSession,
    pub store: Arc<dyn Store>,
}

impl Session {
    #[inline]
    pub fn user(&self) -> &User {
        &self.session.user
    }

    #[inline]
    pub fn token(&self) -> &str {
        &self.session.token
    }
}

impl FromRequestParts<SharedState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        let Some(session) = state.backend.auth().session(token).await? else {
            state.carts.discard(token);
            return Err(ApiError::unauthorized());
        };
        let store = state.backend.store_for(&session);
        Ok(Session { session, store })
    }
}

/// Token of an `Authorization: Bearer` header, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}
