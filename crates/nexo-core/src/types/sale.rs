//! Sales and their line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    /// Store credit: charged to the customer's account.
    Credito,
}

impl PaymentMethod {
    /// Status a freshly created sale gets for this payment method.
    pub fn initial_status(self) -> SaleStatus {
        match self {
            PaymentMethod::Credito => SaleStatus::Pending,
            _ => SaleStatus::Completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Credito => "credito",
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// Sale lifecycle. Set once at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Completed,
    /// Credit sale awaiting payment.
    Pending,
    Cancelled,
}

// =============================================================================
// Sale
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
    /// Customer name at time of sale (frozen).
    pub customer_name: Option<String>,
    pub status: SaleStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    pub fn from_new(id: String, new: NewSale, now: DateTime<Utc>) -> Self {
        Sale {
            id,
            sale_date: new.sale_date,
            total_amount: new.total_amount,
            payment_method: new.payment_method,
            customer_id: new.customer_id,
            customer_name: new.customer_name,
            status: new.status,
            notes: new.notes,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSale {
    pub sale_date: DateTime<Utc>,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub status: SaleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SaleStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SalePatch {
    pub fn apply(&self, sale: &mut Sale) {
        if let Some(status) = self.status {
            sale.status = status;
        }
        if let Some(notes) = &self.notes {
            sale.notes = Some(notes.clone());
        }
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a sale. Product data is frozen at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// unit_price × quantity
    pub subtotal: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    pub fn from_new(id: String, new: NewSaleItem, now: DateTime<Utc>) -> Self {
        SaleItem {
            id,
            sale_id: new.sale_id,
            product_id: new.product_id,
            product_name: new.product_name,
            quantity: new.quantity,
            unit_price: new.unit_price,
            subtotal: new.subtotal,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSaleItem {
    pub sale_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Sale items are immutable once written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleItemPatch {}

impl SaleItemPatch {
    pub fn apply(&self, _item: &mut SaleItem) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status_from_payment_method() {
        assert_eq!(PaymentMethod::Credito.initial_status(), SaleStatus::Pending);
        assert_eq!(PaymentMethod::Cash.initial_status(), SaleStatus::Completed);
        assert_eq!(PaymentMethod::Card.initial_status(), SaleStatus::Completed);
        assert_eq!(PaymentMethod::Transfer.initial_status(), SaleStatus::Completed);
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::Credito).unwrap();
        assert_eq!(json, "\"credito\"");
        assert_eq!(PaymentMethod::Transfer.as_str(), "transfer");
    }
}
