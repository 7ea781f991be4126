//! Customers with store credit and their payment ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer who may buy on credit ("credito").
///
/// `current_debt` is expected to stay ≥ 0. Nothing caps it at
/// `credit_limit`; crossing the limit only raises an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub credit_limit: Money,
    pub current_debt: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn from_new(id: String, new: NewCustomer, now: DateTime<Utc>) -> Self {
        Customer {
            id,
            name: new.name,
            phone: new.phone,
            email: new.email,
            address: new.address,
            credit_limit: new.credit_limit,
            current_debt: new.current_debt,
            created_at: now,
            updated_at: now,
        }
    }

    /// Credit still available before the limit is reached (never negative).
    pub fn available_credit(&self) -> Money {
        self.credit_limit.saturating_sub_to_zero(self.current_debt)
    }

    /// Debt level relative to the credit limit.
    ///
    /// ```text
    /// debt = 0          → None
    /// debt ≥ 100% limit → Critical
    /// debt ≥  80% limit → High
    /// debt ≥  50% limit → Medium
    /// otherwise         → Low
    /// ```
    pub fn debt_status(&self) -> DebtStatus {
        let debt = self.current_debt;
        let limit = self.credit_limit;
        if debt.is_zero() {
            DebtStatus::None
        } else if debt.reaches_fraction_of(limit, 1, 1) {
            DebtStatus::Critical
        } else if debt.reaches_fraction_of(limit, 4, 5) {
            DebtStatus::High
        } else if debt.reaches_fraction_of(limit, 1, 2) {
            DebtStatus::Medium
        } else {
            DebtStatus::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    None,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub credit_limit: Money,
    /// Opening balance; usually zero.
    #[serde(default)]
    pub current_debt: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_debt: Option<Money>,
}

impl CustomerPatch {
    /// Patch that only sets the outstanding debt.
    pub fn debt(current_debt: Money) -> Self {
        CustomerPatch {
            current_debt: Some(current_debt),
            ..Default::default()
        }
    }

    pub fn apply(&self, customer: &mut Customer) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            customer.phone = Some(phone.clone());
        }
        if let Some(email) = &self.email {
            customer.email = Some(email.clone());
        }
        if let Some(address) = &self.address {
            customer.address = Some(address.clone());
        }
        if let Some(limit) = self.credit_limit {
            customer.credit_limit = limit;
        }
        if let Some(debt) = self.current_debt {
            customer.current_debt = debt;
        }
    }
}

// =============================================================================
// Credit Payment
// =============================================================================

/// How a credit payment was made. Credit cannot pay off credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentChannel {
    Cash,
    Card,
    Transfer,
}

/// A payment made against a customer's outstanding debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CreditPayment {
    pub id: String,
    pub customer_id: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub payment_date: DateTime<Utc>,
    pub payment_method: PaymentChannel,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CreditPayment {
    pub fn from_new(id: String, new: NewCreditPayment, now: DateTime<Utc>) -> Self {
        CreditPayment {
            id,
            customer_id: new.customer_id,
            amount: new.amount,
            payment_date: now,
            payment_method: new.payment_method,
            notes: new.notes,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCreditPayment {
    pub customer_id: String,
    pub amount: Money,
    pub payment_method: PaymentChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditPaymentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreditPaymentPatch {
    pub fn apply(&self, payment: &mut CreditPayment) {
        if let Some(notes) = &self.notes {
            payment.notes = Some(notes.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(limit: i64, debt: i64) -> Customer {
        Customer::from_new(
            "c1".to_string(),
            NewCustomer {
                name: "Juan Pérez".to_string(),
                phone: None,
                email: None,
                address: None,
                credit_limit: Money::from_pesos(limit),
                current_debt: Money::from_pesos(debt),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_debt_status_thresholds() {
        assert_eq!(customer(300, 0).debt_status(), DebtStatus::None);
        assert_eq!(customer(300, 100).debt_status(), DebtStatus::Low);
        assert_eq!(customer(300, 150).debt_status(), DebtStatus::Medium);
        assert_eq!(customer(300, 240).debt_status(), DebtStatus::High);
        assert_eq!(customer(300, 300).debt_status(), DebtStatus::Critical);
        assert_eq!(customer(300, 450).debt_status(), DebtStatus::Critical);
    }

    #[test]
    fn test_available_credit_floors_at_zero() {
        assert_eq!(customer(500, 150).available_credit().pesos(), 350);
        assert_eq!(customer(500, 650).available_credit().pesos(), 0);
    }

    #[test]
    fn test_payment_channel_rejects_credito() {
        assert!(serde_json::from_str::<PaymentChannel>("\"credito\"").is_err());
        let channel: PaymentChannel = serde_json::from_str("\"transfer\"").unwrap();
        assert_eq!(channel, PaymentChannel::Transfer);
    }
}
