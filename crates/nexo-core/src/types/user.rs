//! Users, roles and sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Employee,
}

/// A user profile. Credentials live with the auth backend, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn from_new(id: String, new: NewUser, now: DateTime<Utc>) -> Self {
        User {
            id,
            email: new.email,
            full_name: new.full_name,
            role: new.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Profile fields written when a user is registered.
///
/// `id` is set when the auth backend has already assigned one (remote
/// sign-up); the local store generates it otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(full_name) = &self.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}

// =============================================================================
// Auth payloads
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// An authenticated session as handed to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthSession {
    /// Opaque bearer token.
    pub token: String,
    pub user: User,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_employee() {
        assert_eq!(UserRole::default(), UserRole::Employee);
        let data: RegisterData = serde_json::from_str(
            r#"{"email":"ana@nexoventis.com","password":"secreto","full_name":"Ana"}"#,
        )
        .unwrap();
        assert_eq!(data.role, None);
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let user = User::from_new(
            "u1".to_string(),
            NewUser {
                id: None,
                email: "ana@nexoventis.com".to_string(),
                full_name: "Ana".to_string(),
                role: UserRole::Employee,
            },
            now,
        );
        let session = AuthSession {
            token: "t".to_string(),
            user,
            expires_at: now - chrono::Duration::seconds(1),
        };
        assert!(session.is_expired(now));
    }
}
