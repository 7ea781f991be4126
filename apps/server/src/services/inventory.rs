//! # Inventory Service
//!
//! Product CRUD and manual stock adjustments.
//!
//! ## Stock Adjustment
//! ```text
//! adjust_stock(product, +12, "Reposición proveedor")
//!      │
//!      ├── delta == 0?               → ValidationError
//!      ├── |delta| too large?        → ValidationError
//!      ├── stock + delta < 0?        → NegativeStock (nothing written)
//!      ├── stock + delta too large?  → ValidationError
//!      │
//!      ├── product.current_stock = stock + delta
//!      ├── StockMovement { entry (+) | exit (−), quantity: delta }
//!      └── alert refresh
//! ```
//!
//! Runs under `AppState::ledger_lock`, shared with checkout.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use nexo_core::filter::{categories as distinct_categories, ProductFilter};
use nexo_core::policy::{authorize, Action};
use nexo_core::validation::{
    validate_new_product, validate_product, validate_stock_delta, validate_stock_level,
};
use nexo_core::{
    CoreError, MovementType, NewProduct, NewStockMovement, Product, ProductPatch, StockMovement,
    User,
};
use nexo_store::{Ordering, Store};

use crate::error::{ApiError, ApiResult};
use crate::services::alerts;
use crate::state::AppState;

/// Reason recorded when the caller gives none.
const DEFAULT_ADJUSTMENT_REASON: &str = "Ajuste manual";

/// Request body for a manual stock adjustment.
#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustment {
    /// Signed change: positive for entries, negative for exits.
    pub delta: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Product after the adjustment and the movement that recorded it.
#[derive(Debug, Clone, Serialize)]
pub struct AdjustedStock {
    pub product: Product,
    pub movement: StockMovement,
}

pub async fn list_products(store: &dyn Store, filter: &ProductFilter) -> ApiResult<Vec<Product>> {
    let products = store.products().list(Ordering::asc("name")).await?;
    Ok(filter.apply(products))
}

pub async fn categories(store: &dyn Store) -> ApiResult<Vec<String>> {
    let products = store.products().all().await?;
    Ok(distinct_categories(&products))
}

pub async fn add_product(
    state: &AppState,
    store: &dyn Store,
    user: &User,
    new: NewProduct,
) -> ApiResult<Product> {
    authorize(user, Action::ManageProducts)?;
    validate_new_product(&new)?;

    let product = store.products().create(new).await?;
    info!(product_id = %product.id, name = %product.name, "Product created");

    alerts::refresh_after_change(state, store).await;
    Ok(product)
}

pub async fn update_product(
    state: &AppState,
    store: &dyn Store,
    user: &User,
    id: &str,
    patch: ProductPatch,
) -> ApiResult<Product> {
    authorize(user, Action::ManageProducts)?;
    let _ledger = state.ledger_lock.lock().await;

    let mut candidate = store
        .products()
        .get(id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
    patch.apply(&mut candidate);
    validate_product(&candidate)?;

    let product = store.products().update(id, patch).await?;
    info!(product_id = %product.id, "Product updated");

    alerts::refresh_after_change(state, store).await;
    Ok(product)
}

/// Admin only.
pub async fn delete_product(
    state: &AppState,
    store: &dyn Store,
    user: &User,
    id: &str,
) -> ApiResult<()> {
    authorize(user, Action::DeleteProduct)?;

    store.products().delete(id).await?;
    info!(product_id = %id, user_id = %user.id, "Product deleted");

    alerts::refresh_after_change(state, store).await;
    Ok(())
}

pub async fn adjust_stock(
    state: &AppState,
    store: &dyn Store,
    user: &User,
    id: &str,
    adjustment: StockAdjustment,
) -> ApiResult<AdjustedStock> {
    authorize(user, Action::ManageProducts)?;
    validate_stock_delta(adjustment.delta)?;
    let _ledger = state.ledger_lock.lock().await;

    let product = store
        .products()
        .get(id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

    let new_stock = match product.current_stock.checked_add(adjustment.delta) {
        Some(stock) if stock >= 0 => stock,
        _ => {
            return Err(CoreError::NegativeStock {
                product: product.name,
                current: product.current_stock,
                delta: adjustment.delta,
            }
            .into());
        }
    };
    validate_stock_level("current_stock", new_stock)?;

    let updated = store
        .products()
        .update(id, ProductPatch::stock(new_stock))
        .await?;

    let reason = adjustment
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_ADJUSTMENT_REASON.to_string());
    let movement_type = if adjustment.delta > 0 {
        MovementType::Entry
    } else {
        MovementType::Exit
    };
    let movement = NewStockMovement {
        product_id: updated.id.clone(),
        product_name: updated.name.clone(),
        movement_type,
        quantity: adjustment.delta,
        reason,
        user_id: Some(user.id.clone()),
    };

    let movement = match store.stock_movements().create(movement).await {
        Ok(movement) => movement,
        Err(e) => {
            warn!(product_id = %id, error = %e, "Movement not recorded, restoring stock");
            if let Err(undo) = store
                .products()
                .update(id, ProductPatch::stock(product.current_stock))
                .await
            {
                warn!(product_id = %id, error = %undo, "Stock restore failed");
            }
            return Err(ApiError::from(e));
        }
    };

    info!(
        product_id = %id,
        delta = adjustment.delta,
        stock = new_stock,
        "Stock adjusted"
    );

    alerts::refresh_after_change(state, store).await;
    Ok(AdjustedStock {
        product: updated,
        movement,
    })
}

/// Movements of one product, newest first.
pub async fn stock_history(store: &dyn Store, id: &str) -> ApiResult<Vec<StockMovement>> {
    store.products().require(id).await?;
    Ok(store
        .stock_movements()
        .find_by("product_id", id, Ordering::desc("date"))
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::testing::{admin, seeded_state};
    use nexo_core::{LoginCredentials, Money, RegisterData, UserRole};

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

    #[tokio::test]
    async fn test_adjust_stock_records_movement() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let pan = product_named(store.as_ref(), "Pan Blanco").await;

        let adjusted = adjust_stock(
            &state,
            store.as_ref(),
            &user,
            &pan.id,
            StockAdjustment {
                delta: 12,
                reason: Some("Reposición".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(adjusted.product.current_stock, 20);
        assert_eq!(adjusted.movement.movement_type, MovementType::Entry);
        assert_eq!(adjusted.movement.quantity, 12);

        let history = stock_history(store.as_ref(), &pan.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_id.as_deref(), Some(user.id.as_str()));
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_negative_result() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let pan = product_named(store.as_ref(), "Pan Blanco").await;

        let err = adjust_stock(
            &state,
            store.as_ref(),
            &user,
            &pan.id,
            StockAdjustment {
                delta: -9,
                reason: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let unchanged = store.products().require(&pan.id).await.unwrap();
        assert_eq!(unchanged.current_stock, 8);
        assert!(store.stock_movements().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_oversized_delta() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let pan = product_named(store.as_ref(), "Pan Blanco").await;

        for delta in [i64::MAX, i64::MIN, nexo_core::MAX_STOCK_LEVEL + 1] {
            let err = adjust_stock(
                &state,
                store.as_ref(),
                &user,
                &pan.id,
                StockAdjustment {
                    delta,
                    reason: None,
                },
            )
            .await
            .unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }

        // In range on its own, out of range once added to the stock on hand.
        let err = adjust_stock(
            &state,
            store.as_ref(),
            &user,
            &pan.id,
            StockAdjustment {
                delta: nexo_core::MAX_STOCK_LEVEL,
                reason: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let unchanged = store.products().require(&pan.id).await.unwrap();
        assert_eq!(unchanged.current_stock, 8);
        assert!(store.stock_movements().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_validates_merged_product() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let coca = product_named(store.as_ref(), "Coca Cola 2L").await;

        let patch = ProductPatch {
            min_stock: Some(80),
            ..Default::default()
        };
        let err = update_product(&state, store.as_ref(), &user, &coca.id, patch)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let patch = ProductPatch {
            unit_price: Some(Money::from_pesos(i64::MAX)),
            ..Default::default()
        };
        let err = update_product(&state, store.as_ref(), &user, &coca.id, patch)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let patch = ProductPatch {
            unit_price: Some(Money::from_pesos(2_690)),
            ..Default::default()
        };
        let updated = update_product(&state, store.as_ref(), &user, &coca.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.unit_price, Money::from_pesos(2_690));
    }

    #[tokio::test]
    async fn test_employee_cannot_delete_products() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let auth = state.backend.auth();
        let acting = auth
            .login(&LoginCredentials {
                email: "admin@nexoventis.com".to_string(),
                password: "admin123".to_string(),
            })
            .await
            .unwrap();
        let data = RegisterData {
            email: "caja@nexoventis.com".to_string(),
            password: "caja123".to_string(),
            full_name: "Cajera".to_string(),
            role: None,
        };
        let employee = auth.register(&data, UserRole::Employee, &acting).await.unwrap();
        let coca = product_named(store.as_ref(), "Coca Cola 2L").await;

        let err = delete_product(&state, store.as_ref(), &employee, &coca.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        delete_product(&state, store.as_ref(), &acting.user, &coca.id)
            .await
            .unwrap();
        assert!(store.products().get(&coca.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filter_and_categories() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();

        let filter = ProductFilter {
            search: Some("LECHE".to_string()),
            ..Default::default()
        };
        let found = list_products(store.as_ref(), &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Leche Entera 1L");

        let cats = categories(store.as_ref()).await.unwrap();
        assert_eq!(cats.len(), 3);
        assert!(cats.contains(&"Bebidas".to_string()));
    }
}
