//! # Customer Service
//!
//! Customer records and credit payments.
//!
//! ## Credit Payment
//! ```text
//! add_payment(customer, amount, method)
//!      │
//!      ├── amount <= 0?                 → PaymentError
//!      ├── customer missing?            → NotFound
//!      │
//!      ├── current_debt = max(0, debt − amount)
//!      ├── CreditPayment { amount, method }   (restores debt if this fails)
//!      └── alert refresh
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use nexo_core::filter::CustomerFilter;
use nexo_core::policy::{authorize, Action};
use nexo_core::validation::{validate_customer, validate_new_customer, validate_payment_amount};
use nexo_core::{
    CoreError, CreditPayment, Customer, CustomerPatch, Money, NewCreditPayment, NewCustomer,
    PaymentChannel, User,
};
use nexo_store::{Ordering, Store};

use crate::error::{ApiError, ApiResult};
use crate::services::alerts;
use crate::state::AppState;

/// Request body for a credit payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub amount: Money,
    pub method: PaymentChannel,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Customer after the payment and the stored payment record.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub customer: Customer,
    pub payment: CreditPayment,
    /// Part of the payment that exceeded the debt.
    pub excess: Money,
}

pub async fn list_customers(
    store: &dyn Store,
    filter: &CustomerFilter,
) -> ApiResult<Vec<Customer>> {
    let customers = store.customers().list(Ordering::asc("name")).await?;
    Ok(filter.apply(customers))
}

pub async fn add_customer(
    state: &AppState,
    store: &dyn Store,
    user: &User,
    new: NewCustomer,
) -> ApiResult<Customer> {
    authorize(user, Action::ManageCustomers)?;
    validate_new_customer(&new)?;

    let customer = store.customers().create(new).await?;
    info!(customer_id = %customer.id, name = %customer.name, "Customer created");

    alerts::refresh_after_change(state, store).await;
    Ok(customer)
}

pub async fn update_customer(
    state: &AppState,
    store: &dyn Store,
    user: &User,
    id: &str,
    patch: CustomerPatch,
) -> ApiResult<Customer> {
    authorize(user, Action::ManageCustomers)?;
    let _ledger = state.ledger_lock.lock().await;

    let mut candidate = find(store, id).await?;
    patch.apply(&mut candidate);
    validate_customer(&candidate)?;

    let customer = store.customers().update(id, patch).await?;
    info!(customer_id = %customer.id, "Customer updated");

    alerts::refresh_after_change(state, store).await;
    Ok(customer)
}

pub async fn add_payment(
    state: &AppState,
    store: &dyn Store,
    user: &User,
    id: &str,
    request: PaymentRequest,
) -> ApiResult<PaymentReceipt> {
    authorize(user, Action::RecordPayment)?;
    validate_payment_amount(request.amount).map_err(|e| CoreError::InvalidPaymentAmount {
        reason: e.to_string(),
    })?;
    let _ledger = state.ledger_lock.lock().await;

    let customer = find(store, id).await?;
    let previous_debt = customer.current_debt;
    let new_debt = previous_debt.saturating_sub_to_zero(request.amount);
    let excess = request.amount.saturating_sub_to_zero(previous_debt);

    let customer = store
        .customers()
        .update(id, CustomerPatch::debt(new_debt))
        .await?;

    let record = NewCreditPayment {
        customer_id: customer.id.clone(),
        amount: request.amount,
        payment_method: request.method,
        notes: request.notes.filter(|n| !n.trim().is_empty()),
    };
    let payment = match store.payments().create(record).await {
        Ok(payment) => payment,
        Err(e) => {
            warn!(customer_id = %id, error = %e, "Payment not recorded, restoring debt");
            if let Err(undo) = store
                .customers()
                .update(id, CustomerPatch::debt(previous_debt))
                .await
            {
                warn!(customer_id = %id, error = %undo, "Debt restore failed");
            }
            return Err(ApiError::from(e));
        }
    };

    info!(
        customer_id = %id,
        amount = %payment.amount,
        debt = %customer.current_debt,
        "Credit payment recorded"
    );

    alerts::refresh_after_change(state, store).await;
    Ok(PaymentReceipt {
        customer,
        payment,
        excess,
    })
}

/// Payments of one customer, newest first.
pub async fn payment_history(store: &dyn Store, id: &str) -> ApiResult<Vec<CreditPayment>> {
    find(store, id).await?;
    Ok(store
        .payments()
        .find_by("customer_id", id, Ordering::desc("payment_date"))
        .await?)
}

async fn find(store: &dyn Store, id: &str) -> ApiResult<Customer> {
    match store.customers().get(id).await? {
        Some(customer) => Ok(customer),
        None => Err(CoreError::CustomerNotFound(id.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::testing::{admin, seeded_state};
    use nexo_core::AlertType;

    async fn customer_named(store: &dyn Store, name: &str) -> Customer {
        store
            .customers()
            .all()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap()
    }

    #[tokio::test]
    async fn test_payment_larger_than_debt_clears_it() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let juan = customer_named(store.as_ref(), "Juan Pérez").await;

        let receipt = add_payment(
            &state,
            store.as_ref(),
            &user,
            &juan.id,
            PaymentRequest {
                amount: Money::from_pesos(300_000),
                method: PaymentChannel::Transfer,
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(receipt.customer.current_debt, Money::zero());
        assert_eq!(receipt.excess, Money::from_pesos(20_000));
        assert_eq!(receipt.payment.amount, Money::from_pesos(300_000));

        let history = payment_history(store.as_ref(), &juan.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].payment_method, PaymentChannel::Transfer);

        // The high debt alert for Juan stays stored but no longer refreshes.
        let alerts = store.alerts().all().await.unwrap();
        assert!(alerts.iter().any(|a| {
            a.alert_type == AlertType::HighDebt && a.related_id.as_deref() == Some(juan.id.as_str())
        }));
    }

    #[tokio::test]
    async fn test_payment_must_be_positive() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;
        let maria = customer_named(store.as_ref(), "María González").await;

        let err = add_payment(
            &state,
            store.as_ref(),
            &user,
            &maria.id,
            PaymentRequest {
                amount: Money::zero(),
                method: PaymentChannel::Cash,
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(store.payments().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_for_unknown_customer() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;

        let err = add_payment(
            &state,
            store.as_ref(),
            &user,
            "missing",
            PaymentRequest {
                amount: Money::from_pesos(1_000),
                method: PaymentChannel::Cash,
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_new_customer_near_limit_raises_alert() {
        let state = seeded_state().await;
        let store = state.backend.system_store().unwrap();
        let user = admin(&state).await;

        let customer = add_customer(
            &state,
            store.as_ref(),
            &user,
            NewCustomer {
                name: "Rosa Muñoz".to_string(),
                phone: None,
                email: None,
                address: Some("Pasaje Los Aromos 12".to_string()),
                credit_limit: Money::from_pesos(100_000),
                current_debt: Money::from_pesos(80_000),
            },
        )
        .await
        .unwrap();

        let alerts = store.alerts().all().await.unwrap();
        let alert = alerts
            .iter()
            .find(|a| a.related_id.as_deref() == Some(customer.id.as_str()))
            .unwrap();
        assert_eq!(alert.message, "Rosa Muñoz está cerca de su límite de crédito");

        let filter = CustomerFilter {
            search: Some("aromos".to_string()),
            ..Default::default()
        };
        let found = list_customers(store.as_ref(), &filter).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
