//! User administration. Admin only.

use tracing::info;

use nexo_core::policy::{authorize, Action};
use nexo_core::{User, UserPatch};
use nexo_store::{Ordering, Store};

use crate::error::{ApiError, ApiResult};

pub async fn list_users(store: &dyn Store, user: &User) -> ApiResult<Vec<User>> {
    authorize(user, Action::ManageUsers)?;
    Ok(store.users().list(Ordering::asc("full_name")).await?)
}

/// Activates or deactivates a user. Deactivated users can no longer log
/// in and their open sessions stop resolving.
pub async fn set_user_active(
    store: &dyn Store,
    acting: &User,
    id: &str,
    is_active: bool,
) -> ApiResult<User> {
    authorize(acting, Action::ManageUsers)?;
    if acting.id == id && !is_active {
        return Err(ApiError::business("You cannot deactivate your own account"));
    }

    let patch = UserPatch {
        is_active: Some(is_active),
        ..Default::default()
    };
    let user = store.users().update(id, patch).await?;
    info!(user_id = %user.id, is_active, by = %acting.id, "User status changed");
    Ok(user)
}
