//! # Authentication Backends
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────┬──────────────────────────┐
//! │                      │ LocalAuth                │ RemoteAuth               │
//! ├──────────────────────┼──────────────────────────┼──────────────────────────┤
//! │ credentials          │ argon2 hash in SQLite    │ hosted /auth/v1          │
//! │ session token        │ random, `sessions` table │ issued by hosted service │
//! │ profile              │ `users` table            │ `users` table (REST)     │
//! └──────────────────────┴──────────────────────────┴──────────────────────────┘
//! ```
//!
//! Login failures are always [`StoreError::InvalidCredentials`], whether the
//! email is unknown, the user is inactive or the password is wrong.
//!
//! [`StoreError::InvalidCredentials`]: crate::StoreError::InvalidCredentials

use async_trait::async_trait;

use nexo_core::{AuthSession, LoginCredentials, RegisterData, User, UserRole};

use crate::error::StoreResult;

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Creates credentials and profile for a new user. The caller has
    /// already checked that `acting` may manage users.
    async fn register(
        &self,
        data: &RegisterData,
        role: UserRole,
        acting: &AuthSession,
    ) -> StoreResult<User>;

    async fn login(&self, credentials: &LoginCredentials) -> StoreResult<AuthSession>;

    /// Ends a session. Unknown tokens are ignored.
    async fn logout(&self, token: &str) -> StoreResult<()>;

    /// The live session behind `token`; `None` when unknown, expired or
    /// when the user has been deactivated.
    async fn session(&self, token: &str) -> StoreResult<Option<AuthSession>>;

    /// Drops every expired session. Returns how many were dropped.
    async fn purge_expired(&self) -> StoreResult<usize>;

    /// Creates a first admin when no user exists yet. Returns whether one
    /// was created.
    async fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> StoreResult<bool>;
}

/// Normalizes an email for lookups (surrounding whitespace only; matching
/// stays case-sensitive).
pub(crate) fn normalize_email(email: &str) -> &str {
    email.trim()
}
