//! # Error Types
//!
//! Domain-specific error types for nexo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  nexo-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  nexo-store errors (separate crate)                                    │
//! │  └── StoreError       - Local or remote store failures                 │
//! │                                                                         │
//! │  server errors                                                         │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI                     │
//! │        StoreError ─────────────────→ ApiError → UI                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is raised *before* any mutation happens, so callers can
//! surface it without worrying about partial effects.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Referenced customer does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Referenced alert does not exist.
    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    /// Referenced user does not exist.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A cart line asks for more units than are in stock.
    ///
    /// ## When This Occurs
    /// ```text
    /// Cart: Pan Blanco × 10
    ///      │
    ///      ▼
    /// Fresh stock read: 8
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Pan Blanco", available: 8, requested: 10 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A stock adjustment would leave the product below zero.
    #[error("Stock for {product} cannot go below zero (current {current}, change {delta})")]
    NegativeStock {
        product: String,
        current: i64,
        delta: i64,
    },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A credit sale needs a customer to charge.
    #[error("A customer is required for credit sales")]
    CustomerRequired,

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A computed amount (line total, sale total, new debt) does not fit.
    #[error("{what} exceeds the largest supported amount")]
    AmountTooLarge { what: String },

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// The acting user may not perform the action.
    #[error("Not allowed to {action}")]
    Forbidden { action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed email or id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., email already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Pan Blanco".to_string(),
            available: 8,
            requested: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Pan Blanco: available 8, requested 10"
        );
        assert_eq!(
            CoreError::CustomerRequired.to_string(),
            "A customer is required for credit sales"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
