//! Local auth fallback: argon2 password hashes and server-held sessions.

use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use nexo_core::{generate_id, AuthSession, LoginCredentials, NewUser, RegisterData, User, UserRole};

use crate::auth::{normalize_email, AuthBackend};
use crate::error::{StoreError, StoreResult};
use crate::local::table::SqlRow;
use crate::table::Entity;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against its stored hash. Malformed hashes never match.
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Checked when the email is unknown, so every login branch pays for one
/// argon2 verification.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("nexoventis-unknown-user").unwrap_or_default())
}

fn new_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Users and sessions in the local SQLite database.
pub struct LocalAuth {
    pool: SqlitePool,
    session_lifetime: Duration,
}

impl LocalAuth {
    pub fn new(pool: SqlitePool, session_lifetime: Duration) -> Self {
        LocalAuth {
            pool,
            session_lifetime,
        }
    }

    async fn user(&self, id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Profile and credentials in one transaction.
    async fn insert_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: UserRole,
    ) -> StoreResult<User> {
        let user = User::build(
            generate_id(),
            NewUser {
                id: None,
                email: email.to_string(),
                full_name: full_name.to_string(),
                role,
            },
            Utc::now(),
        );
        let password_hash = hash_password(password)?;

        let columns = User::COLUMNS.join(", ");
        let placeholders = vec!["?"; User::COLUMNS.len()].join(", ");
        let insert_profile = format!("INSERT INTO users ({columns}) VALUES ({placeholders})");

        let mut tx = self.pool.begin().await?;
        user.bind_columns(sqlx::query(&insert_profile))
            .execute(&mut *tx)
            .await
            .map_err(|e| duplicate_email(e, email))?;
        sqlx::query("INSERT INTO credentials (user_id, email, password_hash) VALUES (?, ?, ?)")
            .bind(&user.id)
            .bind(email)
            .bind(password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| duplicate_email(e, email))?;
        tx.commit().await?;

        Ok(user)
    }
}

fn duplicate_email(err: sqlx::Error, email: &str) -> StoreError {
    match StoreError::from(err) {
        StoreError::UniqueViolation { .. } => StoreError::duplicate("email", email),
        other => other,
    }
}

#[async_trait]
impl AuthBackend for LocalAuth {
    async fn register(
        &self,
        data: &RegisterData,
        role: UserRole,
        acting: &AuthSession,
    ) -> StoreResult<User> {
        let email = normalize_email(&data.email);
        let user = self
            .insert_user(email, &data.password, data.full_name.trim(), role)
            .await?;

        info!(user_id = %user.id, role = ?role, by = %acting.user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> StoreResult<AuthSession> {
        let email = normalize_email(&credentials.email);

        let row: Option<(String, String)> =
            sqlx::query_as("SELECT user_id, password_hash FROM credentials WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        let Some((user_id, password_hash)) = row else {
            let _ = verify_password(&credentials.password, dummy_hash());
            debug!("Login for unknown email");
            return Err(StoreError::InvalidCredentials);
        };
        if !verify_password(&credentials.password, &password_hash) {
            debug!(user_id = %user_id, "Login with wrong password");
            return Err(StoreError::InvalidCredentials);
        }
        let user = match self.user(&user_id).await? {
            Some(user) if user.is_active => user,
            _ => {
                warn!(user_id = %user_id, "Login refused for inactive user");
                return Err(StoreError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        let session = AuthSession {
            token: new_token(),
            user,
            expires_at: now + self.session_lifetime,
        };
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
            .bind(&session.token)
            .bind(&session.user.id)
            .bind(session.expires_at)
            .bind(now)
            .execute(&self.pool)
            .await?;

        info!(user_id = %session.user.id, "User logged in");
        Ok(session)
    }

    async fn logout(&self, token: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        debug!("Session closed");
        Ok(())
    }

    async fn session(&self, token: &str) -> StoreResult<Option<AuthSession>> {
        let row: Option<(String, DateTime<Utc>)> =
            sqlx::query_as("SELECT user_id, expires_at FROM sessions WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        let Some((user_id, expires_at)) = row else {
            return Ok(None);
        };
        if expires_at < Utc::now() {
            debug!(user_id = %user_id, "Discarding expired session");
            self.logout(token).await?;
            return Ok(None);
        }

        Ok(self
            .user(&user_id)
            .await?
            .filter(|user| user.is_active)
            .map(|user| AuthSession {
                token: token.to_string(),
                user,
                expires_at,
            }))
    }

    async fn purge_expired(&self) -> StoreResult<usize> {
        let rows: Vec<(String, DateTime<Utc>)> =
            sqlx::query_as("SELECT token, expires_at FROM sessions")
                .fetch_all(&self.pool)
                .await?;

        let now = Utc::now();
        let mut purged = 0;
        for (token, expires_at) in rows {
            if expires_at < now {
                self.logout(&token).await?;
                purged += 1;
            }
        }
        Ok(purged)
    }

    async fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> StoreResult<bool> {
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if users > 0 {
            return Ok(false);
        }

        let admin = self
            .insert_user(normalize_email(email), password, full_name, UserRole::Admin)
            .await?;
        info!(user_id = %admin.id, email = %admin.email, "Bootstrap admin created");
        Ok(true)
    }
}
