//! # Cart State
//!
//! One cart per authenticated session, keyed by session token.
//!
//! ## Thread Safety
//! The carts live behind a `Mutex` because requests from the same session
//! may arrive concurrently. The lock is never held across an `.await`:
//! every access goes through a closure.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Client Action            HTTP Command              Cart State Change   │
//! │  ─────────────            ────────────              ─────────────────   │
//! │                                                                         │
//! │  Tap product ────────────► POST /cart/items ──────► Cart::add          │
//! │                                                                         │
//! │  Change quantity ────────► PATCH /cart/items/{id} ► Cart::update_qty   │
//! │                                                                         │
//! │  Tap remove ─────────────► DELETE /cart/items/{id}► Cart::remove       │
//! │                                                                         │
//! │  Tap clear ──────────────► DELETE /cart ──────────► discard            │
//! │                                                                         │
//! │  Checkout ok / logout ───────────────────────────► discard             │
//! │                                                                         │
//! │  Session expired ────────► any command / sweep ───► discard             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use nexo_core::cart::Cart;

/// Carts of every live session.
#[derive(Debug, Default)]
pub struct CartRegistry {
    carts: Mutex<HashMap<String, Cart>>,
}

impl CartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Cart>> {
        // A panic while holding the lock leaves the map itself intact.
        self.carts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the session's cart (empty when it has none yet).
    pub fn snapshot(&self, token: &str) -> Cart {
        self.lock().get(token).cloned().unwrap_or_default()
    }

    /// Executes a function with write access to the session's cart.
    ///
    /// The change is kept only when `f` succeeds. A session gets an entry
    /// once its cart has a line and loses it when the cart empties.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// carts.with_cart_mut(&token, |cart| cart.add(&product, 1, now))?;
    /// ```
    pub fn with_cart_mut<F, T, E>(&self, token: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Cart) -> Result<T, E>,
    {
        let mut carts = self.lock();
        let mut cart = carts.get(token).cloned().unwrap_or_default();
        let result = f(&mut cart)?;
        if cart.is_empty() {
            carts.remove(token);
        } else {
            carts.insert(token.to_string(), cart);
        }
        Ok(result)
    }

    /// Drops the session's cart.
    pub fn discard(&self, token: &str) {
        self.lock().remove(token);
    }

    /// Tokens of every session holding a cart.
    pub fn tokens(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Number of sessions holding a cart.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nexo_core::{Money, NewProduct, Product};

    fn product() -> Product {
        Product::from_new(
            "p1".to_string(),
            NewProduct {
                name: "Coca Cola 2L".to_string(),
                description: None,
                barcode: None,
                category: "Bebidas".to_string(),
                current_stock: 24,
                min_stock: 10,
                max_stock: 50,
                unit_price: Money::from_pesos(2_490),
                cost_price: Money::from_pesos(1_790),
                supplier: None,
                expiry_date: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_carts_are_per_session() {
        let carts = CartRegistry::new();
        carts
            .with_cart_mut("token-a", |cart| cart.add(&product(), 2, Utc::now()))
            .unwrap();

        assert_eq!(carts.snapshot("token-a").total_quantity(), 2);
        assert!(carts.snapshot("token-b").is_empty());
        assert_eq!(carts.len(), 1);
    }

    #[test]
    fn test_failed_change_leaves_no_entry() {
        let carts = CartRegistry::new();
        let err = carts.with_cart_mut("token-a", |cart| cart.update_quantity("p1", 3));
        assert!(err.is_err());
        assert!(carts.is_empty());

        carts
            .with_cart_mut("token-a", |cart| cart.add(&product(), 2, Utc::now()))
            .unwrap();
        let err = carts.with_cart_mut("token-a", |cart| cart.add(&product(), 30, Utc::now()));
        assert!(err.is_err());
        assert_eq!(carts.snapshot("token-a").total_quantity(), 2);

        carts
            .with_cart_mut("token-a", |cart| cart.update_quantity("p1", 0))
            .unwrap();
        assert!(carts.is_empty());
    }

    #[test]
    fn test_discard_empties_cart() {
        let carts = CartRegistry::new();
        carts
            .with_cart_mut("token-a", |cart| cart.add(&product(), 1, Utc::now()))
            .unwrap();

        carts.discard("token-a");
        assert!(carts.snapshot("token-a").is_empty());
        assert!(carts.is_empty());
    }
}
