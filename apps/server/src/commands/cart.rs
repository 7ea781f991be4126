//! # Cart Commands
//!
//! One cart per session, keyed by the bearer token.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│ Completed│       │
//! │  │  Cart    │     │          │     │  Method  │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart        checkout                          │
//! │                   update_item        (sale.rs)                         │
//! │                   remove_item                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use nexo_core::cart::CartSummary;

use crate::commands::{ok, ApiResponse};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, Session};
use crate::services::sales::{self, AddToCart};
use crate::state::SharedState;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuantity {
    pub quantity: i64,
}

pub async fn get_cart(
    State(state): State<SharedState>,
    session: Session,
) -> Json<ApiResponse<CartSummary>> {
    debug!("get_cart command");
    ok(sales::cart(&state, session.token()))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases
/// - If product not in cart: added as new line
/// - Name and price are frozen when the line is first added
///
/// ## Body
/// ```json
/// { "product_id": "1a2b3c4d5e6f", "quantity": 2 }
/// ```
/// `quantity` defaults to 1.
pub async fn add_to_cart(
    State(state): State<SharedState>,
    session: Session,
    ApiJson(request): ApiJson<AddToCart>,
) -> ApiResult<Json<ApiResponse<CartSummary>>> {
    debug!(product_id = %request.product_id, quantity = request.quantity, "add_to_cart command");
    let summary = sales::add_to_cart(
        &state,
        session.store.as_ref(),
        session.user(),
        session.token(),
        request,
    )
    .await?;
    Ok(ok(summary))
}

/// Sets a line's quantity; `0` removes the line.
pub async fn update_cart_item(
    State(state): State<SharedState>,
    session: Session,
    ApiPath(product_id): ApiPath<String>,
    ApiJson(body): ApiJson<UpdateQuantity>,
) -> ApiResult<Json<ApiResponse<CartSummary>>> {
    debug!(product_id = %product_id, quantity = body.quantity, "update_cart_item command");
    let summary = sales::update_cart_item(
        &state,
        session.user(),
        session.token(),
        &product_id,
        body.quantity,
    )?;
    Ok(ok(summary))
}

pub async fn remove_from_cart(
    State(state): State<SharedState>,
    session: Session,
    ApiPath(product_id): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<CartSummary>>> {
    debug!(product_id = %product_id, "remove_from_cart command");
    let summary = sales::remove_cart_item(&state, session.user(), session.token(), &product_id)?;
    Ok(ok(summary))
}

pub async fn clear_cart(
    State(state): State<SharedState>,
    session: Session,
) -> Json<ApiResponse<CartSummary>> {
    debug!("clear_cart command");
    ok(sales::clear_cart(&state, session.token()))
}
