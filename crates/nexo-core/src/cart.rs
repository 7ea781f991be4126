//! # Cart
//!
//! The session-local shopping cart. Carts are never persisted; one lives
//! per authenticated session and is discarded on checkout or clear.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Register Action          Operation               Cart Change           │
//! │  ───────────────          ─────────               ───────────           │
//! │                                                                         │
//! │  Tap product ────────────► add() ───────────────► merge or push line   │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ───► set qty (≤ 0 removes)│
//! │                                                                         │
//! │  Tap remove ─────────────► remove() ────────────► drop line            │
//! │                                                                         │
//! │  Tap clear ──────────────► clear() ─────────────► empty                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id` (adding the same product sums quantity)
//! - Every line has `1 ..= MAX_ITEM_QUANTITY` units
//! - At most `MAX_CART_ITEMS` lines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A product and quantity in the cart.
///
/// Name and price are frozen when the line is first added, so the cart
/// shows what the cashier rang up even if the product is edited meanwhile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64, now: DateTime<Utc>) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            quantity,
            added_at: now,
        }
    }

    /// unit_price × quantity
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds `quantity` units of `product`, merging into an existing line.
    ///
    /// Rejects quantities outside `1..=999` (after merging), a 101st line,
    /// and more units than the product currently has in stock.
    pub fn add(&mut self, product: &Product, quantity: i64, now: DateTime<Utc>) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let existing = self.lines.iter().position(|l| l.product_id == product.id);
        let merged = existing.map_or(0, |i| self.lines[i].quantity) + quantity;

        if merged > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: merged,
                max: MAX_ITEM_QUANTITY,
            });
        }
        if merged > product.current_stock {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.current_stock,
                requested: merged,
            });
        }

        match existing {
            Some(i) => self.lines[i].quantity = merged,
            None => {
                if self.lines.len() >= MAX_CART_ITEMS {
                    return Err(CoreError::CartTooLarge {
                        max: MAX_CART_ITEMS,
                    });
                }
                self.lines.push(CartLine::from_product(product, quantity, now));
            }
        }
        Ok(())
    }

    /// Sets the quantity of a line. `quantity <= 0` removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ(quantity × unit_price)
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            lines: self.lines.clone(),
            line_count: self.line_count(),
            total_quantity: self.total_quantity(),
            total: self.total(),
        }
    }
}

/// Cart contents plus totals, as returned to the register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub line_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
