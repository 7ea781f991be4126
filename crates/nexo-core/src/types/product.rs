//! Products and stock movements.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product kept in inventory and sold at the register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub category: String,

    /// Units on hand. Expected to stay ≥ 0; stock adjustments enforce it.
    pub current_stock: i64,
    /// At or below this level the product is "low stock".
    pub min_stock: i64,
    pub max_stock: i64,

    /// Selling price per unit.
    pub unit_price: Money,
    /// Purchase price per unit (inventory valuation).
    pub cost_price: Money,

    pub supplier: Option<String>,

    #[ts(as = "Option<String>")]
    pub expiry_date: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds a product from a creation payload.
    pub fn from_new(id: String, new: NewProduct, now: DateTime<Utc>) -> Self {
        Product {
            id,
            name: new.name,
            description: new.description,
            barcode: new.barcode,
            category: new.category,
            current_stock: new.current_stock,
            min_stock: new.min_stock,
            max_stock: new.max_stock,
            unit_price: new.unit_price,
            cost_price: new.cost_price,
            supplier: new.supplier,
            expiry_date: new.expiry_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Classifies the stock level.
    ///
    /// Evaluated in order: out, low, high, normal.
    pub fn stock_status(&self) -> StockStatus {
        if self.current_stock == 0 {
            StockStatus::Out
        } else if self.current_stock <= self.min_stock {
            StockStatus::Low
        } else if self.current_stock >= self.max_stock {
            StockStatus::High
        } else {
            StockStatus::Normal
        }
    }

    /// True when stock is at or below the configured minimum.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }

    /// Whole days until expiry, floored (negative once expired).
    ///
    /// `None` when the product has no expiry date.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expiry_date.map(|expiry| {
            let remaining = expiry - now;
            // num_days truncates toward zero; step down for partial negative days.
            let days = remaining.num_days();
            if remaining < Duration::days(days) {
                days - 1
            } else {
                days
            }
        })
    }

    /// Stock valued at purchase price.
    #[inline]
    pub fn inventory_value(&self) -> Money {
        self.cost_price.multiply_quantity(self.current_stock)
    }
}

/// Derived stock level classification shown next to each product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Out,
    Low,
    High,
    Normal,
}

/// Fields supplied when adding a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub category: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub unit_price: Money,
    pub cost_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Partial product update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl ProductPatch {
    /// Patch that only sets the stock level.
    pub fn stock(current_stock: i64) -> Self {
        ProductPatch {
            current_stock: Some(current_stock),
            ..Default::default()
        }
    }

    /// Applies the set fields onto `product`.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(barcode) = &self.barcode {
            product.barcode = Some(barcode.clone());
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(stock) = self.current_stock {
            product.current_stock = stock;
        }
        if let Some(min) = self.min_stock {
            product.min_stock = min;
        }
        if let Some(max) = self.max_stock {
            product.max_stock = max;
        }
        if let Some(price) = self.unit_price {
            product.unit_price = price;
        }
        if let Some(cost) = self.cost_price {
            product.cost_price = cost;
        }
        if let Some(supplier) = &self.supplier {
            product.supplier = Some(supplier.clone());
        }
        if let Some(expiry) = self.expiry_date {
            product.expiry_date = Some(expiry);
        }
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Why a product's stock changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Entry,
    Exit,
    Adjustment,
    Sale,
}

/// One entry in a product's stock history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    /// Product name at time of movement (frozen).
    pub product_name: String,
    pub movement_type: MovementType,
    /// Signed change applied to `current_stock`.
    pub quantity: i64,
    pub reason: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub user_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn from_new(id: String, new: NewStockMovement, now: DateTime<Utc>) -> Self {
        StockMovement {
            id,
            product_id: new.product_id,
            product_name: new.product_name,
            movement_type: new.movement_type,
            quantity: new.quantity,
            reason: new.reason,
            date: now,
            user_id: new.user_id,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStockMovement {
    pub product_id: String,
    pub product_name: String,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Movements are append-only; the patch only fixes the reason text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockMovementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StockMovementPatch {
    pub fn apply(&self, movement: &mut StockMovement) {
        if let Some(reason) = &self.reason {
            movement.reason = reason.clone();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn product(stock: i64, min: i64, max: i64) -> Product {
        let now = Utc::now();
        Product::from_new(
            "p1".to_string(),
            NewProduct {
                name: "Pan Blanco".to_string(),
                description: None,
                barcode: None,
                category: "Panadería".to_string(),
                current_stock: stock,
                min_stock: min,
                max_stock: max,
                unit_price: Money::from_pesos(1990),
                cost_price: Money::from_pesos(1200),
                supplier: None,
                expiry_date: None,
            },
            now,
        )
    }

    #[test]
    fn test_stock_status_order() {
        assert_eq!(product(0, 0, 10).stock_status(), StockStatus::Out);
        assert_eq!(product(5, 5, 10).stock_status(), StockStatus::Low);
        assert_eq!(product(10, 5, 10).stock_status(), StockStatus::High);
        assert_eq!(product(7, 5, 10).stock_status(), StockStatus::Normal);
    }

    #[test]
    fn test_days_until_expiry_floors() {
        let now = Utc::now();
        let mut p = product(10, 5, 20);
        assert_eq!(p.days_until_expiry(now), None);

        p.expiry_date = Some(now + Duration::hours(71));
        assert_eq!(p.days_until_expiry(now), Some(2));

        p.expiry_date = Some(now - Duration::hours(1));
        assert_eq!(p.days_until_expiry(now), Some(-1));

        p.expiry_date = Some(now - Duration::milliseconds(500));
        assert_eq!(p.days_until_expiry(now), Some(-1));

        p.expiry_date = Some(now - Duration::days(2));
        assert_eq!(p.days_until_expiry(now), Some(-2));

        p.expiry_date = Some(now);
        assert_eq!(p.days_until_expiry(now), Some(0));
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut p = product(10, 5, 20);
        let patch = ProductPatch {
            name: Some("Pan Integral".to_string()),
            unit_price: Some(Money::from_pesos(2290)),
            ..Default::default()
        };
        patch.apply(&mut p);

        assert_eq!(p.name, "Pan Integral");
        assert_eq!(p.unit_price.pesos(), 2290);
        assert_eq!(p.current_stock, 10);
        assert_eq!(p.category, "Panadería");
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let json = serde_json::to_value(ProductPatch::stock(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "current_stock": 3 }));
    }

    #[test]
    fn test_inventory_value() {
        assert_eq!(product(10, 5, 20).inventory_value().pesos(), 12_000);
    }
}
