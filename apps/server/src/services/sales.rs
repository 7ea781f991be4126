//! # Sales Service
//!
//! Cart operations for a session and the checkout saga.
//!
//! ## Checkout Saga
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Fresh reads: customer (if any), every product in the cart          │
//! │  2. CheckoutPlan::prepare   (all preconditions, no writes)             │
//! │                                                                         │
//! │  3. Forward steps, each pushing its undo onto the log:                 │
//! │                                                                         │
//! │     create Sale ───────────────► undo: delete sale                     │
//! │     create SaleItem × n ───────► undo: delete item                     │
//! │     per line:                                                           │
//! │       (undo: restore stock) ───► set stock to stock_after              │
//! │       create StockMovement ────► undo: delete movement                 │
//! │     credito:                                                            │
//! │       (undo: restore debt) ────► set debt to debt + total              │
//! │                                                                         │
//! │  4. Failure at any step: run the log in reverse, report the original   │
//! │     error. Success: alert refresh.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Updates push their undo before running, so a write that succeeded but
//! reported failure is still reverted.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use nexo_core::cart::{Cart, CartSummary};
use nexo_core::checkout::CheckoutPlan;
use nexo_core::filter::SaleFilter;
use nexo_core::policy::{authorize, Action};
use nexo_core::{
    CoreError, CustomerPatch, Money, PaymentMethod, ProductPatch, Sale, SaleItem, User,
};
use nexo_store::{Ordering, Store, StoreError};

use crate::error::{ApiError, ApiResult};
use crate::services::alerts;
use crate::state::AppState;

// =============================================================================
// Cart
// =============================================================================

/// Request body for adding a product to the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCart {
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

pub fn cart(state: &AppState, token: &str) -> CartSummary {
    state.carts.snapshot(token).summary()
}

/// Adds a product at its current price.
pub async fn add_to_cart(
    state: &AppState,
    store: &dyn Store,
    user: &User,
    token: &str,
    request: AddToCart,
) -> ApiResult<CartSummary> {
    authorize(user, Action::Sell)?;

    let product = store
        .products()
        .get(&request.product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(request.product_id.clone()))?;

    let now = Utc::now();
    let summary = state.carts.with_cart_mut(token, |cart| {
        cart.add(&product, request.quantity, now)?;
        Ok::<_, ApiError>(cart.summary())
    })?;

    debug!(product_id = %product.id, quantity = request.quantity, "Added to cart");
    Ok(summary)
}

/// `quantity <= 0` removes the line.
pub fn update_cart_item(
    state: &AppState,
    user: &User,
    token: &str,
    product_id: &str,
    quantity: i64,
) -> ApiResult<CartSummary> {
    authorize(user, Action::Sell)?;
    state.carts.with_cart_mut(token, |cart| {
        cart.update_quantity(product_id, quantity)?;
        Ok(cart.summary())
    })
}

pub fn remove_cart_item(
    state: &AppState,
    user: &User,
    token: &str,
    product_id: &str,
) -> ApiResult<CartSummary> {
    authorize(user, Action::Sell)?;
    state.carts.with_cart_mut(token, |cart| {
        if cart.remove(product_id) {
            Ok(cart.summary())
        } else {
            Err(CoreError::NotInCart(product_id.to_string()).into())
        }
    })
}

pub fn clear_cart(state: &AppState, token: &str) -> CartSummary {
    state.carts.discard(token);
    Cart::new().summary()
}

// =============================================================================
// Checkout
// =============================================================================

/// Request body for checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The stored sale and its lines.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Undo step recorded by the saga.
#[derive(Debug)]
enum Compensation {
    DeleteSale(String),
    DeleteSaleItem(String),
    RestoreStock { product_id: String, stock: i64 },
    DeleteMovement(String),
    RestoreDebt { customer_id: String, debt: Money },
}

impl Compensation {
    async fn run(&self, store: &dyn Store) -> Result<(), StoreError> {
        match self {
            Compensation::DeleteSale(id) => store.sales().delete(id).await,
            Compensation::DeleteSaleItem(id) => store.sale_items().delete(id).await,
            Compensation::RestoreStock { product_id, stock } => store
                .products()
                .update(product_id, ProductPatch::stock(*stock))
                .await
                .map(|_| ()),
            Compensation::DeleteMovement(id) => store.stock_movements().delete(id).await,
            Compensation::RestoreDebt { customer_id, debt } => store
                .customers()
                .update(customer_id, CustomerPatch::debt(*debt))
                .await
                .map(|_| ()),
        }
    }
}

/// Undo log, run newest first.
#[derive(Debug, Default)]
struct Saga {
    log: Vec<Compensation>,
}

impl Saga {
    fn record(&mut self, step: Compensation) {
        self.log.push(step);
    }

    async fn compensate(self, store: &dyn Store) {
        for step in self.log.into_iter().rev() {
            match step.run(store).await {
                Ok(()) => debug!(?step, "Compensated"),
                // A sale deleted first may already have taken its items along.
                Err(StoreError::NotFound { .. }) => debug!(?step, "Nothing to compensate"),
                Err(e) => warn!(?step, error = %e, "Compensation failed"),
            }
        }
    }
}

/// Runs the checkout for the session's cart. The cart is cleared only when
/// every step succeeded.
pub async fn checkout(
    state: &AppState,
    store: &dyn Store,
    user: &User,
    token: &str,
    request: CheckoutRequest,
) -> ApiResult<CompletedSale> {
    authorize(user, Action::Sell)?;
    let _ledger = state.ledger_lock.lock().await;

    let cart = state.carts.snapshot(token);

    let customer = match request.customer_id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => Some(
            store
                .customers()
                .get(id)
                .await?
                .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))?,
        ),
        None => None,
    };

    let mut products = Vec::with_capacity(cart.line_count());
    for line in &cart.lines {
        if let Some(product) = store.products().get(&line.product_id).await? {
            products.push(product);
        }
    }

    let mut plan = CheckoutPlan::prepare(
        &cart,
        request.payment_method,
        customer.as_ref(),
        &products,
        Utc::now(),
    )?;
    plan.sale.notes = request.notes.filter(|n| !n.trim().is_empty());

    let mut saga = Saga::default();
    match execute(store, user, &plan, &mut saga).await {
        Ok(completed) => {
            state.carts.discard(token);
            info!(
                sale_id = %completed.sale.id,
                total = %completed.sale.total_amount,
                method = %completed.sale.payment_method.as_str(),
                items = completed.items.len(),
                "Sale completed"
            );
            alerts::refresh_after_change(state, store).await;
            Ok(completed)
        }
        Err(e) => {
            warn!(error = %e, steps = saga.log.len(), "Checkout failed, compensating");
            saga.compensate(store).await;
            Err(e.into())
        }
    }
}

async fn execute(
    store: &dyn Store,
    user: &User,
    plan: &CheckoutPlan,
    saga: &mut Saga,
) -> Result<CompletedSale, StoreError> {
    let sale = store.sales().create(plan.sale.clone()).await?;
    saga.record(Compensation::DeleteSale(sale.id.clone()));

    let mut items = Vec::with_capacity(plan.lines.len());
    for line in &plan.lines {
        let item = store
            .sale_items()
            .create(CheckoutPlan::sale_item(&sale.id, line))
            .await?;
        saga.record(Compensation::DeleteSaleItem(item.id.clone()));
        items.push(item);
    }

    for line in &plan.lines {
        saga.record(Compensation::RestoreStock {
            product_id: line.product_id.clone(),
            stock: line.stock_before,
        });
        store
            .products()
            .update(&line.product_id, ProductPatch::stock(line.stock_after))
            .await?;

        let movement = store
            .stock_movements()
            .create(CheckoutPlan::stock_movement(&sale.id, line, Some(&user.id)))
            .await?;
        saga.record(Compensation::DeleteMovement(movement.id));
    }

    if let Some(debt) = &plan.debt {
        saga.record(Compensation::RestoreDebt {
            customer_id: debt.customer_id.clone(),
            debt: debt.before,
        });
        store
            .customers()
            .update(&debt.customer_id, CustomerPatch::debt(debt.after))
            .await?;
    }

    Ok(CompletedSale { sale, items })
}

// =============================================================================
// History
// =============================================================================

/// Sales matching the filter, newest first.
pub async fn list_sales(store: &dyn Store, filter: &SaleFilter) -> ApiResult<Vec<Sale>> {
    let sales = store.sales().list(Ordering::desc("sale_date")).await?;
    Ok(filter.apply(sales))
}

pub async fn sale_items(store: &dyn Store, sale_id: &str) -> ApiResult<Vec<SaleItem>> {
    store.sales().require(sale_id).await?;
    Ok(store
        .sale_items()
        .find_by("sale_id", sale_id, Ordering::asc("created_at"))
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::testing::{admin, seeded_state};
    use nexo_core::{Product, SaleStatus};

    async fn product_named(store: &dyn Store, name: &str) -> Product {
        store
            .products()
            .all()
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    fn add(product: &Product, quantity: i64) -> AddToCart {
        AddToCart {
            product_id: product.id.clone(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_cash_checkout_decrements_stock_and_clears_cart() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let coca = product_named(store.as_ref(), "Coca Cola 2L").await;
        let leche = product_named(store.as_ref(), "Leche Entera 1L").await;

        add_to_cart(&state, store.as_ref(), &user, "t", add(&coca, 2)).await.unwrap();
        let summary = add_to_cart(&state, store.as_ref(), &user, "t", add(&leche, 1))
            .await
            .unwrap();
        assert_eq!(summary.total, Money::from_pesos(2 * 2_490 + 1_190));

        let completed = checkout(
            &state,
            store.as_ref(),
            &user,
            "t",
            CheckoutRequest {
                payment_method: PaymentMethod::Cash,
                customer_id: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(completed.sale.total_amount, Money::from_pesos(6_170));
        assert_eq!(completed.sale.status, SaleStatus::Completed);
        assert_eq!(completed.items.len(), 2);
        assert!(cart(&state, "t").lines.is_empty());

        let coca = store.products().require(&coca.id).await.unwrap();
        assert_eq!(coca.current_stock, 22);
        let leche = store.products().require(&leche.id).await.unwrap();
        assert_eq!(leche.current_stock, 14);

        let movements = store.stock_movements().all().await.unwrap();
        assert_eq!(movements.len(), 2);
        assert!(movements.iter().all(|m| m.quantity < 0));

        let items = sale_items(store.as_ref(), &completed.sale.id).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_credito_checkout_charges_customer() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let pan = product_named(store.as_ref(), "Pan Blanco").await;
        let maria = store
            .customers()
            .all()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == "María González")
            .unwrap();

        add_to_cart(&state, store.as_ref(), &user, "t", add(&pan, 2)).await.unwrap();
        let completed = checkout(
            &state,
            store.as_ref(),
            &user,
            "t",
            CheckoutRequest {
                payment_method: PaymentMethod::Credito,
                customer_id: Some(maria.id.clone()),
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(completed.sale.status, SaleStatus::Pending);
        assert_eq!(completed.sale.customer_name.as_deref(), Some("María González"));

        let maria = store.customers().require(&maria.id).await.unwrap();
        assert_eq!(maria.current_debt, Money::from_pesos(150_000 + 3_980));
    }

    #[tokio::test]
    async fn test_failed_preconditions_write_nothing() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let pan = product_named(store.as_ref(), "Pan Blanco").await;
        let sales_before = store.sales().all().await.unwrap().len();

        let cash = || CheckoutRequest {
            payment_method: PaymentMethod::Cash,
            customer_id: None,
            notes: None,
        };

        let err = checkout(&state, store.as_ref(), &user, "t", cash()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        add_to_cart(&state, store.as_ref(), &user, "t", add(&pan, 5)).await.unwrap();
        let credito = CheckoutRequest {
            payment_method: PaymentMethod::Credito,
            customer_id: None,
            notes: None,
        };
        let err = checkout(&state, store.as_ref(), &user, "t", credito).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Another register sold most of the bread meanwhile.
        store.products().update(&pan.id, ProductPatch::stock(3)).await.unwrap();
        let err = checkout(&state, store.as_ref(), &user, "t", cash()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        assert_eq!(store.sales().all().await.unwrap().len(), sales_before);
        assert_eq!(cart(&state, "t").total_quantity, 5);
    }

    #[tokio::test]
    async fn test_compensation_restores_stock() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let coca = product_named(store.as_ref(), "Coca Cola 2L").await;
        let pan = product_named(store.as_ref(), "Pan Blanco").await;

        add_to_cart(&state, store.as_ref(), &user, "t", add(&coca, 1)).await.unwrap();
        add_to_cart(&state, store.as_ref(), &user, "t", add(&pan, 1)).await.unwrap();
        let cart = state.carts.snapshot("t");
        let products = store.products().all().await.unwrap();
        let plan =
            CheckoutPlan::prepare(&cart, PaymentMethod::Cash, None, &products, Utc::now()).unwrap();

        // The bread disappears after planning: its stock update fails.
        store.products().delete(&pan.id).await.unwrap();

        let mut saga = Saga::default();
        let err = execute(store.as_ref(), &user, &plan, &mut saga).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        saga.compensate(store.as_ref()).await;

        let coca_after = store.products().require(&coca.id).await.unwrap();
        assert_eq!(coca_after.current_stock, coca.current_stock);
        assert!(store.stock_movements().all().await.unwrap().is_empty());
        assert_eq!(store.sales().all().await.unwrap().len(), 2);
        assert_eq!(store.sale_items().all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stock_adjustment_waits_for_checkout() {
        use crate::services::inventory::{adjust_stock, StockAdjustment};

        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let coca = product_named(store.as_ref(), "Coca Cola 2L").await;

        // A checkout in progress holds the ledger.
        let ledger = state.ledger_lock.lock().await;

        let adjustment = tokio::spawn({
            let (state, store, user, id) =
                (state.clone(), store.clone(), user.clone(), coca.id.clone());
            async move {
                let restock = StockAdjustment {
                    delta: 12,
                    reason: Some("Reposición".to_string()),
                };
                adjust_stock(&state, store.as_ref(), &user, &id, restock).await
            }
        });
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(!adjustment.is_finished());
        assert_eq!(store.products().require(&coca.id).await.unwrap().current_stock, 24);
        drop(ledger);

        add_to_cart(&state, store.as_ref(), &user, "t", add(&coca, 2)).await.unwrap();
        let sale = checkout(
            &state,
            store.as_ref(),
            &user,
            "t",
            CheckoutRequest {
                payment_method: PaymentMethod::Cash,
                customer_id: None,
                notes: None,
            },
        );
        let (sale, adjusted) = tokio::join!(sale, adjustment);
        sale.unwrap();
        adjusted.unwrap().unwrap();

        // Both writes survive and the movements add up to the stock change.
        let coca_after = store.products().require(&coca.id).await.unwrap();
        assert_eq!(coca_after.current_stock, 24 - 2 + 12);
        let moved: i64 = store
            .stock_movements()
            .all()
            .await
            .unwrap()
            .iter()
            .map(|m| m.quantity)
            .sum();
        assert_eq!(moved, 10);
    }

    #[tokio::test]
    async fn test_cart_updates() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let coca = product_named(store.as_ref(), "Coca Cola 2L").await;

        add_to_cart(&state, store.as_ref(), &user, "t", add(&coca, 1)).await.unwrap();
        let summary = update_cart_item(&state, &user, "t", &coca.id, 4).unwrap();
        assert_eq!(summary.total_quantity, 4);

        let err = remove_cart_item(&state, &user, "t", "missing").unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        let summary = update_cart_item(&state, &user, "t", &coca.id, 0).unwrap();
        assert!(summary.lines.is_empty());

        let err = add_to_cart(&state, store.as_ref(), &user, "t", add(&coca, 25))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }
}
