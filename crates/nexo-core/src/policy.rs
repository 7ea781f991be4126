//! # Authorization Policy
//!
//! One place decides who may do what. Every mutating service call asks
//! [`authorize`] before touching the store.
//!
//! ```text
//! ┌──────────────────────┬─────────┬──────────┐
//! │ Action               │  admin  │ employee │
//! ├──────────────────────┼─────────┼──────────┤
//! │ ManageUsers          │   ✅    │    ❌    │
//! │ DeleteProduct        │   ✅    │    ❌    │
//! │ everything else      │   ✅    │    ✅    │
//! └──────────────────────┴─────────┴──────────┘
//! Inactive users are refused every action.
//! ```

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::User;

/// Something a user asks the system to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read-only access to any page.
    View,
    /// Create or edit products, adjust stock.
    ManageProducts,
    DeleteProduct,
    ManageCustomers,
    RecordPayment,
    /// Cart operations and checkout.
    Sell,
    ManageAlerts,
    /// Register users, change roles, deactivate.
    ManageUsers,
}

impl Action {
    pub fn requires_admin(self) -> bool {
        matches!(self, Action::ManageUsers | Action::DeleteProduct)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::View => "view data",
            Action::ManageProducts => "manage products",
            Action::DeleteProduct => "delete products",
            Action::ManageCustomers => "manage customers",
            Action::RecordPayment => "record payments",
            Action::Sell => "sell",
            Action::ManageAlerts => "manage alerts",
            Action::ManageUsers => "manage users",
        };
        f.write_str(s)
    }
}

/// Checks whether `user` may perform `action`.
pub fn authorize(user: &User, action: Action) -> CoreResult<()> {
    if !user.is_active || (action.requires_admin() && !user.is_admin()) {
        return Err(CoreError::Forbidden {
            action: action.to_string(),
        });
    }
    Ok(())
}
