//! # Sale Commands
//!
//! Checkout and sales history.

use axum::extract::State;
use axum::Json;
use tracing::debug;

use nexo_core::filter::SaleFilter;
use nexo_core::{Sale, SaleItem};

use crate::commands::{ok, ApiResponse};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Session};
use crate::services::sales::{self, CheckoutRequest, CompletedSale};
use crate::state::SharedState;

/// Completes the sale for the session's cart.
///
/// ## Body
/// ```json
/// { "payment_method": "credito", "customer_id": "9f8e7d6c5b4a" }
/// ```
/// `customer_id` is required for `credito` and optional otherwise.
///
/// ## Returns
/// The stored sale with its items. The cart is empty afterwards; on any
/// error it is left untouched.
pub async fn checkout(
    State(state): State<SharedState>,
    session: Session,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> ApiResult<Json<ApiResponse<CompletedSale>>> {
    debug!(method = request.payment_method.as_str(), "checkout command");
    let completed = sales::checkout(
        &state,
        session.store.as_ref(),
        session.user(),
        session.token(),
        request,
    )
    .await?;
    Ok(ok(completed))
}

/// `?payment_method=credito&status=pending&search=maría&customer_id=...`
pub async fn list_sales(
    session: Session,
    ApiQuery(filter): ApiQuery<SaleFilter>,
) -> ApiResult<Json<ApiResponse<Vec<Sale>>>> {
    debug!(?filter, "list_sales command");
    Ok(ok(sales::list_sales(session.store.as_ref(), &filter).await?))
}

pub async fn sale_items(
    session: Session,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<Vec<SaleItem>>>> {
    Ok(ok(sales::sale_items(session.store.as_ref(), &id).await?))
}
