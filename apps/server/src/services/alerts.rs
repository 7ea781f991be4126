//! # Alert Service
//!
//! Runs the alert generator against the store and serves the alert list.
//!
//! ## Refresh
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products + customers ──► rules::generate ──► candidates                │
//! │                                                   │                     │
//! │  stored alerts ─────────► rules::reconcile ◄──────┘                     │
//! │                               │   (within the 50-alert cap)             │
//! │              ┌────────────────┼─────────────────────┐                   │
//! │              ▼                ▼                     ▼                   │
//! │       delete (evicted)  create (new key)  update + reopen (changed)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Runs after every product or customer mutation, at startup and at login.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use nexo_core::alerts as rules;
use nexo_core::policy::{authorize, Action};
use nexo_core::{Alert, AlertPatch, User, MAX_STORED_ALERTS};
use nexo_store::{Ordering, Store};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// What one generator run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertRefresh {
    pub created: usize,
    pub reopened: usize,
    pub evicted: usize,
}

/// Brings the stored alerts in line with current products and customers.
pub async fn refresh(state: &AppState, store: &dyn Store) -> ApiResult<AlertRefresh> {
    let _guard = state.alert_lock.lock().await;

    let products = store.products().all().await?;
    let customers = store.customers().all().await?;
    let existing = store.alerts().all().await?;

    let candidates = rules::generate(&products, &customers, Utc::now());
    let plan = rules::reconcile(&existing, candidates);

    let mut outcome = AlertRefresh::default();
    for id in plan.evictions {
        store.alerts().delete(&id).await?;
        outcome.evicted += 1;
    }
    for new in plan.inserts {
        store.alerts().create(new).await?;
        outcome.created += 1;
    }
    for (id, patch) in plan.refreshes {
        store.alerts().update(&id, patch).await?;
        outcome.reopened += 1;
    }

    if outcome == AlertRefresh::default() {
        debug!("Alerts unchanged");
    } else {
        info!(
            created = outcome.created,
            reopened = outcome.reopened,
            evicted = outcome.evicted,
            "Alerts refreshed"
        );
    }
    Ok(outcome)
}

/// Refresh after a mutation. The mutation already succeeded, so a failure
/// here is logged and swallowed.
pub async fn refresh_after_change(state: &AppState, store: &dyn Store) {
    if let Err(e) = refresh(state, store).await {
        warn!(error = %e, "Alert refresh after change failed");
    }
}

/// On-demand run requested by a user.
pub async fn regenerate(
    state: &AppState,
    store: &dyn Store,
    user: &User,
) -> ApiResult<AlertRefresh> {
    authorize(user, Action::ManageAlerts)?;
    refresh(state, store).await
}

/// Newest first, at most `MAX_STORED_ALERTS`.
pub async fn list(store: &dyn Store) -> ApiResult<Vec<Alert>> {
    let mut alerts = store.alerts().list(Ordering::desc("created_at")).await?;
    alerts.truncate(MAX_STORED_ALERTS);
    Ok(alerts)
}

pub async fn unread_count(store: &dyn Store) -> ApiResult<usize> {
    Ok(list(store).await?.iter().filter(|a| !a.is_read).count())
}

pub async fn mark_read(store: &dyn Store, user: &User, id: &str) -> ApiResult<Alert> {
    authorize(user, Action::ManageAlerts)?;
    if store.alerts().get(id).await?.is_none() {
        return Err(ApiError::not_found("Alert", id));
    }
    Ok(store.alerts().update(id, AlertPatch::read()).await?)
}

/// Marks every unread alert as read. Returns how many changed.
pub async fn mark_all_read(store: &dyn Store, user: &User) -> ApiResult<usize> {
    authorize(user, Action::ManageAlerts)?;
    let mut changed = 0;
    for alert in store.alerts().all().await?.into_iter().filter(|a| !a.is_read) {
        store.alerts().update(&alert.id, AlertPatch::read()).await?;
        changed += 1;
    }
    debug!(changed, "Alerts marked as read");
    Ok(changed)
}
