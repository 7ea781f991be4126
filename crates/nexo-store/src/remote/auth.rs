//! Hosted auth service (`/auth/v1/*`) with profiles in the `users` table.
//!
//! Tokens are issued by the hosted service. The server remembers which
//! user each token belongs to and when it expires, and re-reads the
//! profile on every check so deactivation takes effect immediately.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use nexo_core::{AuthSession, LoginCredentials, NewUser, RegisterData, User, UserRole};

use crate::auth::{normalize_email, AuthBackend};
use crate::error::{StoreError, StoreResult};
use crate::remote::client::RestClient;
use crate::remote::table::RemoteTable;
use crate::table::Table;

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

/// Sign-up answers with either the bare user or a session wrapping it.
#[derive(Debug, Deserialize)]
struct SignupResponse {
    id: Option<String>,
    user: Option<AuthUser>,
}

impl SignupResponse {
    fn user_id(self) -> Option<String> {
        self.user.map(|u| u.id).or(self.id)
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: String,
    expires_at: DateTime<Utc>,
}

pub struct RemoteAuth {
    client: Arc<RestClient>,
    session_lifetime: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl RemoteAuth {
    pub fn new(client: Arc<RestClient>, session_lifetime: Duration) -> Self {
        RemoteAuth {
            client,
            session_lifetime,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn users(&self, token: &str) -> RemoteTable<User> {
        RemoteTable::new(self.client.clone(), Some(token.to_string()))
    }

    async fn forget(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }
}

#[async_trait]
impl AuthBackend for RemoteAuth {
    async fn register(
        &self,
        data: &RegisterData,
        role: UserRole,
        acting: &AuthSession,
    ) -> StoreResult<User> {
        let email = normalize_email(&data.email);
        let url = self.client.auth_url("signup")?;
        let request = self.client.request(Method::POST, url, None).json(&json!({
            "email": email,
            "password": data.password,
            "data": { "full_name": data.full_name.trim() },
        }));

        let signup: SignupResponse = match self.client.send_json(request).await {
            Ok(signup) => signup,
            Err(StoreError::Remote { message, .. }) if message.contains("already") => {
                return Err(StoreError::duplicate("email", email));
            }
            Err(e) => return Err(e),
        };
        let user_id = signup
            .user_id()
            .ok_or_else(|| StoreError::Decode("sign-up response without user id".to_string()))?;

        let user = self
            .users(&acting.token)
            .create(NewUser {
                id: Some(user_id),
                email: email.to_string(),
                full_name: data.full_name.trim().to_string(),
                role,
            })
            .await?;

        info!(user_id = %user.id, role = ?role, by = %acting.user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> StoreResult<AuthSession> {
        let mut url = self.client.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let request = self.client.request(Method::POST, url, None).json(&json!({
            "email": normalize_email(&credentials.email),
            "password": credentials.password,
        }));

        let token: TokenResponse = match self.client.send_json(request).await {
            Ok(token) => token,
            Err(StoreError::Unauthorized) => return Err(StoreError::InvalidCredentials),
            Err(StoreError::Remote { status, .. }) if status == 400 => {
                return Err(StoreError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let user = match self.users(&token.access_token).get(&token.user.id).await? {
            Some(user) if user.is_active => user,
            _ => {
                warn!(user_id = %token.user.id, "Login refused: profile missing or inactive");
                let _ = self.logout(&token.access_token).await;
                return Err(StoreError::InvalidCredentials);
            }
        };

        let lifetime = token
            .expires_in
            .map(Duration::seconds)
            .unwrap_or(self.session_lifetime);
        let session = AuthSession {
            token: token.access_token,
            user,
            expires_at: Utc::now() + lifetime,
        };
        self.sessions.write().await.insert(
            session.token.clone(),
            SessionEntry {
                user_id: session.user.id.clone(),
                expires_at: session.expires_at,
            },
        );

        info!(user_id = %session.user.id, "User logged in");
        Ok(session)
    }

    async fn logout(&self, token: &str) -> StoreResult<()> {
        self.forget(token).await;
        let url = self.client.auth_url("logout")?;
        let request = self.client.request(Method::POST, url, Some(token));
        match self.client.send_empty(request).await {
            Ok(()) | Err(StoreError::Unauthorized) => {
                debug!("Session closed");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn session(&self, token: &str) -> StoreResult<Option<AuthSession>> {
        let Some(entry) = self.sessions.read().await.get(token).cloned() else {
            return Ok(None);
        };
        if entry.expires_at < Utc::now() {
            debug!(user_id = %entry.user_id, "Discarding expired session");
            self.forget(token).await;
            return Ok(None);
        }

        let user = match self.users(token).get(&entry.user_id).await {
            Ok(user) => user,
            Err(StoreError::Unauthorized) => {
                self.forget(token).await;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(user.filter(|u| u.is_active).map(|user| AuthSession {
            token: token.to_string(),
            user,
            expires_at: entry.expires_at,
        }))
    }

    async fn purge_expired(&self) -> StoreResult<usize> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at >= now);
        Ok(before - sessions.len())
    }

    /// Users of the hosted service are provisioned there.
    async fn bootstrap_admin(
        &self,
        _email: &str,
        _password: &str,
        _full_name: &str,
    ) -> StoreResult<bool> {
        debug!("Skipping admin bootstrap for hosted store");
        Ok(false)
    }
}
