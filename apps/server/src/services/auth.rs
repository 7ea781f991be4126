//! # Auth Service
//!
//! Login, logout, session lookup and user registration on top of the
//! backend's `AuthBackend`.
//!
//! ```text
//! login ──► AuthBackend::login ──► alert refresh (as the new session)
//! logout ─► AuthBackend::logout ─► drop the session's cart
//! sweep ──► AuthBackend::purge_expired ─► drop carts of dead sessions
//! ```

use tracing::{debug, info, warn};

use nexo_core::policy::{authorize, Action};
use nexo_core::validation::{validate_email, validate_password, validate_required_text};
use nexo_core::{AuthSession, LoginCredentials, RegisterData, User, UserRole};

use crate::error::{ApiError, ApiResult};
use crate::services::alerts;
use crate::state::AppState;

pub async fn login(state: &AppState, credentials: LoginCredentials) -> ApiResult<AuthSession> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let session = state.backend.auth().login(&credentials).await?;
    info!(user_id = %session.user.id, role = ?session.user.role, "User logged in");

    let store = state.backend.store_for(&session);
    if let Err(e) = alerts::refresh(state, store.as_ref()).await {
        warn!(error = %e, "Alert refresh at login failed");
    }
    Ok(session)
}

pub async fn logout(state: &AppState, token: &str) -> ApiResult<()> {
    state.carts.discard(token);
    state.backend.auth().logout(token).await?;
    info!("User logged out");
    Ok(())
}

/// The live session behind `token`.
pub async fn session(state: &AppState, token: &str) -> ApiResult<AuthSession> {
    state
        .backend
        .auth()
        .session(token)
        .await?
        .ok_or_else(ApiError::unauthorized)
}

/// Drops expired sessions and every cart whose session is gone. Returns
/// how many carts were dropped.
pub async fn sweep_expired(state: &AppState) -> ApiResult<usize> {
    let auth = state.backend.auth();
    let sessions = auth.purge_expired().await?;

    let mut carts = 0;
    for token in state.carts.tokens() {
        if auth.session(&token).await?.is_none() {
            state.carts.discard(&token);
            carts += 1;
        }
    }

    if sessions + carts > 0 {
        info!(sessions, carts, "Expired sessions swept");
    } else {
        debug!("No expired sessions");
    }
    Ok(carts)
}

/// Registers a new user. Admin only; the role defaults to employee.
pub async fn register(
    state: &AppState,
    acting: &AuthSession,
    data: RegisterData,
) -> ApiResult<User> {
    authorize(&acting.user, Action::ManageUsers)?;
    validate_email(data.email.trim())?;
    validate_password(&data.password)?;
    validate_required_text("full_name", &data.full_name)?;

    let role = data.role.unwrap_or(UserRole::Employee);
    let user = state.backend.auth().register(&data, role, acting).await?;
    info!(user_id = %user.id, role = ?user.role, by = %acting.user.id, "User registered");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::testing::seeded_state;
    use chrono::Utc;

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_logout_cycle() {
        let state = seeded_state().await;

        let session = login(&state, credentials("admin@nexoventis.com", "admin123"))
            .await
            .unwrap();
        assert!(session.user.is_admin());

        let again = super::session(&state, &session.token).await.unwrap();
        assert_eq!(again.user.id, session.user.id);

        let store = state.backend.system_store().unwrap();
        let product = store.products().all().await.unwrap().remove(0);
        state
            .carts
            .with_cart_mut(&session.token, |cart| cart.add(&product, 1, Utc::now()))
            .unwrap();
        logout(&state, &session.token).await.unwrap();
        assert!(state.carts.is_empty());

        let err = super::session(&state, &session.token).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_sweep_drops_carts_of_dead_sessions() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let product = store.products().all().await.unwrap().remove(0);
        let live = login(&state, credentials("admin@nexoventis.com", "admin123"))
            .await
            .unwrap();

        for token in [live.token.as_str(), "expired-token"] {
            state
                .carts
                .with_cart_mut(token, |cart| cart.add(&product, 1, Utc::now()))
                .unwrap();
        }

        assert_eq!(sweep_expired(&state).await.unwrap(), 1);
        assert_eq!(state.carts.tokens(), vec![live.token.clone()]);
        assert_eq!(sweep_expired(&state).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let state = seeded_state().await;

        let err = login(&state, credentials("admin@nexoventis.com", "nope123"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        let err = login(&state, credentials("", "")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_register_validates_and_requires_admin() {
        let state = seeded_state().await;
        let admin = login(&state, credentials("admin@nexoventis.com", "admin123"))
            .await
            .unwrap();

        let short = RegisterData {
            email: "caja@nexoventis.com".to_string(),
            password: "123".to_string(),
            full_name: "Cajera".to_string(),
            role: None,
        };
        let err = register(&state, &admin, short.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let data = RegisterData {
            password: "caja123".to_string(),
            ..short
        };
        let user = register(&state, &admin, data).await.unwrap();
        assert_eq!(user.role, UserRole::Employee);

        let employee = login(&state, credentials("caja@nexoventis.com", "caja123"))
            .await
            .unwrap();
        let other = RegisterData {
            email: "otro@nexoventis.com".to_string(),
            password: "otro123".to_string(),
            full_name: "Otro".to_string(),
            role: Some(UserRole::Admin),
        };
        let err = register(&state, &employee, other).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
