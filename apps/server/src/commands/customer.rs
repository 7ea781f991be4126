//! # Customer Commands
//!
//! Customer records and credit ("fiado") payments.

use axum::extract::State;
use axum::Json;
use tracing::debug;

use nexo_core::filter::CustomerFilter;
use nexo_core::{CreditPayment, Customer, CustomerPatch, NewCustomer};

use crate::commands::{ok, ApiResponse};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, Session};
use crate::services::customers::{self, PaymentReceipt, PaymentRequest};
use crate::state::SharedState;

/// `?search=` matches name, phone or address; `?with_debt_only=true`.
pub async fn list_customers(
    session: Session,
    ApiQuery(filter): ApiQuery<CustomerFilter>,
) -> ApiResult<Json<ApiResponse<Vec<Customer>>>> {
    debug!(?filter, "list_customers command");
    Ok(ok(customers::list_customers(session.store.as_ref(), &filter).await?))
}

pub async fn add_customer(
    State(state): State<SharedState>,
    session: Session,
    ApiJson(new): ApiJson<NewCustomer>,
) -> ApiResult<Json<ApiResponse<Customer>>> {
    debug!(name = %new.name, "add_customer command");
    let customer =
        customers::add_customer(&state, session.store.as_ref(), session.user(), new).await?;
    Ok(ok(customer))
}

pub async fn update_customer(
    State(state): State<SharedState>,
    session: Session,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<CustomerPatch>,
) -> ApiResult<Json<ApiResponse<Customer>>> {
    debug!(customer_id = %id, "update_customer command");
    let customer =
        customers::update_customer(&state, session.store.as_ref(), session.user(), &id, patch)
            .await?;
    Ok(ok(customer))
}

/// Records a payment against the customer's debt.
///
/// ## Body
/// ```json
/// { "amount": 50000, "method": "cash", "notes": "Abono semanal" }
/// ```
pub async fn add_payment(
    State(state): State<SharedState>,
    session: Session,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<PaymentRequest>,
) -> ApiResult<Json<ApiResponse<PaymentReceipt>>> {
    debug!(customer_id = %id, amount = %request.amount, "add_payment command");
    let receipt =
        customers::add_payment(&state, session.store.as_ref(), session.user(), &id, request)
            .await?;
    Ok(ok(receipt))
}

pub async fn payment_history(
    session: Session,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<ApiResponse<Vec<CreditPayment>>>> {
    Ok(ok(customers::payment_history(session.store.as_ref(), &id).await?))
}
