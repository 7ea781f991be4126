//! # API Error Type
//!
//! Unified error type for HTTP commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in NEXOVENTIS                             │
//! │                                                                         │
//! │  Browser                     Rust Backend                               │
//! │  ───────                     ────────────                               │
//! │                                                                         │
//! │  POST /api/cart/checkout                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  ApiResult<Json<ApiResponse<T>>>                                 │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ──── StoreError::Remote{..} ─────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule broken? ──── CoreError::InsufficientStock ─ ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  { "success": false,                                                    │
//! │    "error": { "code": "INSUFFICIENT_STOCK",                             │
//! │               "message": "Insufficient stock for Pan Blanco: ..." } }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use nexo_core::CoreError;
use nexo_store::StoreError;

/// API error returned from HTTP commands.
///
/// ## Serialization
/// This is what the client receives (inside the failure envelope):
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 1a2b3c4d5e6f"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Backing store operation failed (500)
    StoreError,

    /// Hosted store could not be reached (503)
    StoreUnavailable,

    /// Business rule violated (422)
    BusinessLogic,

    /// Internal server error (500)
    Internal,

    /// Cart operation failed (422)
    CartError,

    /// Insufficient stock (409)
    InsufficientStock,

    /// Payment amount rejected (422)
    PaymentError,

    /// Missing, unknown or expired session (401)
    Unauthorized,

    /// Session user may not perform the action (403)
    Forbidden,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::StoreError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::BusinessLogic | ErrorCode::CartError | ErrorCode::PaymentError => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a business rule error.
    pub fn business(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BusinessLogic, message)
    }

    pub fn unauthorized() -> Self {
        ApiError::new(ErrorCode::Unauthorized, "Not authenticated")
    }
}

/// Result type for services and commands.
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            StoreError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            StoreError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            StoreError::Unauthorized => ApiError::unauthorized(),
            StoreError::InvalidCredentials => {
                ApiError::new(ErrorCode::Unauthorized, "Incorrect credentials")
            }
            StoreError::InvalidOrdering { .. } => ApiError::validation(err.to_string()),
            StoreError::ConnectionFailed(_) | StoreError::PoolExhausted => {
                tracing::error!("Store connection problem: {}", err);
                ApiError::new(ErrorCode::StoreError, "Database connection failed")
            }
            StoreError::Http(ref e) => {
                tracing::error!("Hosted store unreachable: {}", e);
                ApiError::new(ErrorCode::StoreUnavailable, "Store service unavailable")
            }
            StoreError::Remote { status, ref message } if (400..500).contains(&status) => {
                tracing::warn!(status, message = %message, "Hosted store rejected request");
                ApiError::new(ErrorCode::ValidationError, message.clone())
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Store operation failed: {}", other);
                ApiError::new(ErrorCode::StoreError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::CustomerNotFound(id) => ApiError::not_found("Customer", &id),
            CoreError::AlertNotFound(id) => ApiError::not_found("Alert", &id),
            CoreError::UserNotFound(id) => ApiError::not_found("User", &id),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::NegativeStock { .. } => ApiError::business(err.to_string()),
            CoreError::EmptyCart | CoreError::NotInCart(_) | CoreError::CartTooLarge { .. } => {
                ApiError::new(ErrorCode::CartError, err.to_string())
            }
            CoreError::CustomerRequired
            | CoreError::QuantityTooLarge { .. }
            | CoreError::AmountTooLarge { .. } => {
                ApiError::validation(err.to_string())
            }
            CoreError::InvalidPaymentAmount { .. } => {
                ApiError::new(ErrorCode::PaymentError, err.to_string())
            }
            CoreError::Forbidden { .. } => ApiError::new(ErrorCode::Forbidden, err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<nexo_core::ValidationError> for ApiError {
    fn from(err: nexo_core::ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: &'a ApiError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            success: false,
            error: &self,
        };
        (self.code.status(), Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_hide_internals() {
        let err: ApiError = StoreError::QueryFailed("syntax error near SELECT".to_string()).into();
        assert_eq!(err.code, ErrorCode::StoreError);
        assert_eq!(err.message, "Database operation failed");

        let err: ApiError = StoreError::InvalidCredentials.into();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        assert_eq!(err.message, "Incorrect credentials");
    }

    #[test]
    fn test_core_errors_keep_their_message() {
        let err: ApiError = CoreError::InsufficientStock {
            product: "Pan Blanco".to_string(),
            available: 8,
            requested: 10,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
        assert!(err.message.contains("Pan Blanco"));

        let err: ApiError = CoreError::Forbidden {
            action: "delete products".to_string(),
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_value(ApiError::not_found("Customer", "c1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Customer not found: c1");
    }
}
