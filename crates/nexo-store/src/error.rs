//! # Store Error Types
//!
//! Error types for every backend behind the persistence adapter.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error          reqwest::Error / HTTP status                     │
//! │       │                        │                                        │
//! │       └──────────┬─────────────┘                                        │
//! │                  ▼                                                      │
//! │  StoreError (this module) ← categorized, never a panic                 │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  ApiError (server) ← serialized for the UI                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Persistence adapter errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (e.g. email already registered).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Local database could not be opened.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Ordering column not allowed for the table.
    #[error("Cannot order {table} by '{column}'")]
    InvalidOrdering { table: String, column: String },

    /// Remote call attempted without an authenticated session.
    #[error("Not authenticated")]
    Unauthorized,

    /// Unknown email, inactive user or wrong password. Deliberately
    /// undifferentiated.
    #[error("Incorrect credentials")]
    InvalidCredentials,

    /// Hosted store answered with a non-success status.
    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Hosted store could not be reached.
    #[error("Remote store unreachable: {0}")]
    Http(String),

    /// Response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for errors caused by the caller rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. }
                | StoreError::UniqueViolation { .. }
                | StoreError::ForeignKeyViolation { .. }
                | StoreError::InvalidOrdering { .. }
                | StoreError::Unauthorized
                | StoreError::InvalidCredentials
        )
    }
}

/// Convert sqlx errors to StoreError.
///
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::Database       → analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        assert_eq!(StoreError::InvalidCredentials.to_string(), "Incorrect credentials");
    }

    #[test]
    fn test_pool_errors() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::PoolExhausted));
        assert!(!err.is_client_error());
    }
}
