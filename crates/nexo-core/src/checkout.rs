//! # Checkout Planning
//!
//! Turns a cart into the full set of writes a sale needs, after checking
//! every precondition. Nothing is written here; the sales service executes
//! the plan step by step and undoes completed steps on failure.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        completeSale                                     │
//! │                                                                         │
//! │  Cart + method + customer? + FRESH product rows                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutPlan::prepare  ← THIS MODULE (fail fast, no writes)           │
//! │       ├── cart empty?                       → EmptyCart                 │
//! │       ├── credito without customer?         → CustomerRequired          │
//! │       ├── line product gone?                → ProductNotFound           │
//! │       ├── quantity > current_stock?         → InsufficientStock         │
//! │       └── total or new debt overflows?      → AmountTooLarge            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Plan: NewSale (total, status) + lines (stock before/after)            │
//! │        + debt change (credito only)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    Customer, MovementType, NewSale, NewSaleItem, NewStockMovement, PaymentMethod, Product,
};
use crate::MAX_MONEY_AMOUNT;

fn too_large(what: impl Into<String>) -> CoreError {
    CoreError::AmountTooLarge { what: what.into() }
}

/// One cart line resolved against the current product row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
    /// Stock read just before checkout.
    pub stock_before: i64,
    pub stock_after: i64,
}

/// Debt change applied to the customer of a credit sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtChange {
    pub customer_id: String,
    pub before: Money,
    pub after: Money,
}

/// Everything a checkout will write, computed up front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutPlan {
    pub sale: NewSale,
    pub lines: Vec<PlannedLine>,
    pub debt: Option<DebtChange>,
}

impl CheckoutPlan {
    /// Checks preconditions and builds the plan.
    ///
    /// `products` must be freshly read from the store; stale cart snapshots
    /// are only used for the frozen name and price of each line.
    pub fn prepare(
        cart: &Cart,
        method: PaymentMethod,
        customer: Option<&Customer>,
        products: &[Product],
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        if method == PaymentMethod::Credito && customer.is_none() {
            return Err(CoreError::CustomerRequired);
        }

        let by_id: HashMap<&str, &Product> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();

        let mut lines = Vec::with_capacity(cart.line_count());
        for line in &cart.lines {
            let product = by_id
                .get(line.product_id.as_str())
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if line.quantity > product.current_stock {
                return Err(CoreError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.current_stock,
                    requested: line.quantity,
                });
            }

            let subtotal = line
                .unit_price
                .checked_mul_quantity(line.quantity)
                .ok_or_else(|| too_large(format!("Line total for {}", line.name)))?;

            lines.push(PlannedLine {
                product_id: line.product_id.clone(),
                product_name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal,
                stock_before: product.current_stock,
                stock_after: product.current_stock - line.quantity,
            });
        }

        let total = lines
            .iter()
            .try_fold(Money::zero(), |acc, l| acc.checked_add(l.subtotal))
            .filter(|t| t.pesos() <= MAX_MONEY_AMOUNT)
            .ok_or_else(|| too_large("Sale total"))?;

        let debt = match (method, customer) {
            (PaymentMethod::Credito, Some(c)) => {
                let after = c
                    .current_debt
                    .checked_add(total)
                    .filter(|d| d.pesos() <= MAX_MONEY_AMOUNT)
                    .ok_or_else(|| too_large(format!("Debt of {}", c.name)))?;
                Some(DebtChange {
                    customer_id: c.id.clone(),
                    before: c.current_debt,
                    after,
                })
            }
            _ => None,
        };

        let sale = NewSale {
            sale_date: now,
            total_amount: total,
            payment_method: method,
            customer_id: customer.map(|c| c.id.clone()),
            customer_name: customer.map(|c| c.name.clone()),
            status: method.initial_status(),
            notes: None,
        };

        Ok(CheckoutPlan { sale, lines, debt })
    }

    #[inline]
    pub fn total(&self) -> Money {
        self.sale.total_amount
    }

    /// Sale item row for a planned line.
    pub fn sale_item(sale_id: &str, line: &PlannedLine) -> NewSaleItem {
        NewSaleItem {
            sale_id: sale_id.to_string(),
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal: line.subtotal,
        }
    }

    /// Stock movement row for a planned line (negative quantity).
    pub fn stock_movement(
        sale_id: &str,
        line: &PlannedLine,
        user_id: Option<&str>,
    ) -> NewStockMovement {
        NewStockMovement {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            movement_type: MovementType::Sale,
            quantity: -line.quantity,
            reason: format!("Venta {}", sale_id),
            user_id: user_id.map(str::to_string),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
