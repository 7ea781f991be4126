//! # Validation Module
//!
//! Input validation rules for NEXOVENTIS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms                                                     │
//! │  └── Required fields, immediate feedback                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Server command (Rust)                                        │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store (SQLite / hosted)                                      │
//! │  └── NOT NULL, UNIQUE, CHECK constraints                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use nexo_core::validation::{validate_quantity, validate_password};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_password("abc").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Customer, NewCustomer, NewProduct, Product};
use crate::{
    MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_MONEY_AMOUNT, MAX_STOCK_LEVEL, MIN_PASSWORD_LENGTH,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display text (names, categories).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string (may be empty).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates an email address.
///
/// Only the shape is checked: one `@` with a non-empty local part and a
/// dotted domain.
///
/// ## Example
/// ```rust
/// use nexo_core::validation::validate_email;
///
/// assert!(validate_email("admin@nexoventis.com").is_ok());
/// assert!(validate_email("admin@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a new password.
///
/// ## Rules
/// - At least `MIN_PASSWORD_LENGTH` (6) characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// Cashier enters quantity: 5
///      │
///      ▼
/// validate_quantity(5)
///      │
///      ├── qty <= 0?   → "quantity must be positive"
///      ├── qty > 999?  → "quantity must be between 1 and 999"
///      └── OK → line added to cart
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or limit. Zero is allowed, up to `MAX_MONEY_AMOUNT`.
pub fn validate_non_negative_money(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if amount.pesos() > MAX_MONEY_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_MONEY_AMOUNT,
        });
    }
    Ok(())
}

/// Validates a payment amount. Cannot pay zero or negative amounts.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }
    if amount.pesos() > MAX_MONEY_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: "payment amount".to_string(),
            min: 1,
            max: MAX_MONEY_AMOUNT,
        });
    }
    Ok(())
}

/// Validates a manual stock adjustment delta.
///
/// ## Rules
/// - Must not be zero
/// - `|delta|` at most `MAX_STOCK_LEVEL`
pub fn validate_stock_delta(delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "adjustment must change the stock".to_string(),
        });
    }
    if delta.unsigned_abs() > MAX_STOCK_LEVEL.unsigned_abs() {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: -MAX_STOCK_LEVEL,
            max: MAX_STOCK_LEVEL,
        });
    }
    Ok(())
}

/// Validates a stock level after an adjustment.
pub fn validate_stock_level(field: &str, level: i64) -> ValidationResult<()> {
    if level < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if level > MAX_STOCK_LEVEL {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK_LEVEL,
        });
    }
    Ok(())
}

/// Validates cart size before adding a new line.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

fn validate_stock_levels(current: i64, min: i64, max: i64) -> ValidationResult<()> {
    for (field, value) in [("current_stock", current), ("min_stock", min), ("max_stock", max)] {
        validate_stock_level(field, value)?;
    }
    if min > max {
        return Err(ValidationError::OutOfRange {
            field: "min_stock".to_string(),
            min: 0,
            max,
        });
    }
    Ok(())
}

/// Validates a product creation payload.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_required_text("name", &product.name)?;
    validate_required_text("category", &product.category)?;
    validate_non_negative_money("unit_price", product.unit_price)?;
    validate_non_negative_money("cost_price", product.cost_price)?;
    validate_stock_levels(product.current_stock, product.min_stock, product.max_stock)
}

/// Validates a product after a patch has been applied.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_required_text("name", &product.name)?;
    validate_required_text("category", &product.category)?;
    validate_non_negative_money("unit_price", product.unit_price)?;
    validate_non_negative_money("cost_price", product.cost_price)?;
    validate_stock_levels(product.current_stock, product.min_stock, product.max_stock)
}

/// Validates a customer creation payload.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_required_text("name", &customer.name)?;
    validate_non_negative_money("credit_limit", customer.credit_limit)?;
    validate_non_negative_money("current_debt", customer.current_debt)?;
    if let Some(email) = customer.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }
    Ok(())
}

/// Validates a customer after a patch has been applied.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_required_text("name", &customer.name)?;
    validate_non_negative_money("credit_limit", customer.credit_limit)?;
    validate_non_negative_money("current_debt", customer.current_debt)?;
    if let Some(email) = customer.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Leche Entera 1L".to_string(),
            description: None,
            barcode: None,
            category: "Lácteos".to_string(),
            current_stock: 15,
            min_stock: 12,
            max_stock: 40,
            unit_price: Money::from_pesos(1190),
            cost_price: Money::from_pesos(850),
            supplier: None,
            expiry_date: None,
        }
    }

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("name", "Pan Blanco").is_ok());
        assert!(validate_required_text("name", "").is_err());
        assert!(validate_required_text("name", "   ").is_err());
        assert!(validate_required_text("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("maria@correo.cl").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("maria").is_err());
        assert!(validate_email("@correo.cl").is_err());
        assert!(validate_email("maria@correo").is_err());
        assert!(validate_email("ma ria@correo.cl").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("admin123").is_ok());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(Money::from_pesos(1)).is_ok());
        assert!(validate_payment_amount(Money::zero()).is_err());
        assert!(validate_payment_amount(Money::from_pesos(-10)).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_new_product(&new_product()).is_ok());

        let mut p = new_product();
        p.min_stock = 50;
        assert!(validate_new_product(&p).is_err());

        let mut p = new_product();
        p.unit_price = Money::from_pesos(-1);
        assert!(matches!(
            validate_new_product(&p),
            Err(ValidationError::MustNotBeNegative { .. })
        ));

        let mut p = new_product();
        p.category = String::new();
        assert!(matches!(
            validate_new_product(&p),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_amounts_and_stock_are_bounded() {
        let mut p = new_product();
        p.unit_price = Money::from_pesos(MAX_MONEY_AMOUNT + 1);
        assert!(matches!(
            validate_new_product(&p),
            Err(ValidationError::OutOfRange { .. })
        ));

        let mut p = new_product();
        p.current_stock = MAX_STOCK_LEVEL + 1;
        p.max_stock = MAX_STOCK_LEVEL + 1;
        assert!(validate_new_product(&p).is_err());

        assert!(validate_payment_amount(Money::from_pesos(MAX_MONEY_AMOUNT)).is_ok());
        assert!(validate_payment_amount(Money::from_pesos(i64::MAX)).is_err());

        assert!(validate_stock_delta(-MAX_STOCK_LEVEL).is_ok());
        assert!(validate_stock_delta(i64::MAX).is_err());
        assert!(validate_stock_delta(i64::MIN).is_err());
        assert!(validate_stock_delta(0).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS - 1).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_err());
    }
}
