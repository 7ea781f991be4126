//! # nexo-core: Pure Business Logic for NEXOVENTIS
//!
//! This crate contains the bookkeeping rules of the business-management
//! backend as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        NEXOVENTIS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Client-rendered UI (out of scope)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               apps/server (services + commands)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ nexo-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  cart   │ │ checkout │ │ alerts  │ │ policy │  │   │
//! │  │   │ Product │ │  Cart   │ │   Plan   │ │ rules + │ │ authz  │  │   │
//! │  │   │Customer │ │CartLine │ │  total   │ │reconcile│ │        │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO IMPLICIT CLOCK         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          nexo-store (SQLite fallback | hosted REST store)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity records (Product, Customer, Sale, Alert, User, ...)
//! - [`money`] - Integer money in Chilean pesos
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation rules
//! - [`cart`] - Session cart
//! - [`checkout`] - Checkout preconditions and sale planning
//! - [`alerts`] - Alert rules and structural reconciliation
//! - [`policy`] - Central authorization policy
//! - [`filter`] - List filters used by the inventory, customer and sales pages
//! - [`report`] - Dashboard statistics and daily summaries
//!
//! ## Example Usage
//!
//! ```rust
//! use nexo_core::money::Money;
//!
//! let price = Money::from_pesos(1990);
//! assert_eq!(price.multiply_quantity(3).pesos(), 5970);
//! assert_eq!(price.to_string(), "$1.990");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alerts;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod filter;
pub mod money;
pub mod policy;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in the cart.
///
/// Guards against typing 1000 instead of 10 at the register.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest price, limit, debt or payment accepted, in pesos.
///
/// A full cart at this price still fits in an `i64`.
pub const MAX_MONEY_AMOUNT: i64 = 1_000_000_000_000;

/// Largest stock level, and largest single adjustment, accepted.
pub const MAX_STOCK_LEVEL: i64 = 1_000_000_000;

/// Number of alerts kept in the store; older ones are evicted.
pub const MAX_STORED_ALERTS: usize = 50;

/// Products expiring within this many days raise an expiry warning.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Expiry warnings at or below this many days are high severity.
pub const EXPIRY_CRITICAL_DAYS: i64 = 3;

/// Default lifetime of a login session.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Generates a short random identifier for locally created records.
///
/// Twelve lowercase hex characters taken from a v4 UUID.
pub fn generate_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_short_hex() {
        let id = generate_id();
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_id());
    }
}
