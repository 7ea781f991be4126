//! # Product Commands
//!
//! Inventory CRUD, categories and manual stock adjustments.

use axum::extract::State;
use axum::Json;
use tracing::debug;

use nexo_core::filter::ProductFilter;
use nexo_core::{NewProduct, Product, ProductPatch, StockMovement};

use crate::commands::{ok, ApiResponse};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Session};
use crate::services::inventory::{self, AdjustedStock, StockAdjustment};
use crate::state::SharedState;

/// Lists products by name.
///
/// ## Query
/// `?search=leche&category=Lácteos&low_stock_only=true`, all optional.
/// `search` matches the name case-insensitively or a barcode substring.
pub async fn list_products(
    session: Session,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> ApiResult<Json<ApiResponse<Vec<Product>>>> {
    debug!(?filter, "list_products command");
    Ok(ok(inventory::list_products(session.store.as_ref(), &filter).await?))
}

pub async fn categories(session: Session) -> ApiResult<Json<ApiResponse<Vec<String>>>> {
    Ok(ok(inventory::categories(session.store.as_ref()).await?))
}

pub async fn add_product(
    State(state): State<SharedState>,
    session: Session,
    ApiJson(new): ApiJson<NewProduct>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    debug!(name = %new.name, "add_product command");
    let product =
        inventory::add_product(&state, session.store.as_ref(), session.user(), new).await?;
    Ok(ok(product))
}

pub async fn update_product(
    State(state): State<SharedState>,
    session: Session,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<ApiResponse<Product>>> {
    debug!(product_id = %id, "update_product command");
    let product =
        inventory::update_product(&state, session.store.as_ref(), session.user(), &id, patch)
            .await?;
    Ok(ok(product))
}

pub async fn delete_product(
    State(state): State<SharedState>,
    session: Session,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    debug!(product_id = %id, "delete_product command");
    inventory::delete_product(&state, session.store.as_ref(), session.user(), &id).await?;
    Ok(ok(()))
}

/// Applies a signed stock change.
///
/// ## Body
/// ```json
/// { "delta": -3, "reason": "Producto dañado" }
/// ```
pub async fn adjust_stock(
    State(state): State<SharedState>,
    session: Session,
    ApiPath(id): ApiPath<String>,
    ApiJson(adjustment): ApiJson<StockAdjustment>,
) -> ApiResult<Json<ApiResponse<AdjustedStock>>> {
    debug!(product_id = %id, delta = adjustment.delta, "adjust_stock command");
    let adjusted = inventory::adjust_stock(
        &state,
        session.store.as_ref(),
        session.user(),
        &id,
        adjustment,
    )
    .await?;
    Ok(ok(adjusted))
}

pub async fn stock_history(
    session: Session,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<Vec<StockMovement>>>> {
    Ok(ok(inventory::stock_history(session.store.as_ref(), &id).await?))
}
