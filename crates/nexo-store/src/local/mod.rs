//! # Local Store
//!
//! SQLite fallback used when no hosted store is configured.
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`table`] - Generic `Table<E>` over SQLite
//! - [`auth`] - argon2 credentials and sessions

pub mod auth;
mod entities;
pub mod migrations;
pub mod pool;
pub mod table;

use async_trait::async_trait;

use nexo_core::{Alert, CreditPayment, Customer, Product, Sale, SaleItem, StockMovement, User};

use crate::table::{BackendKind, Store, Table};

pub use auth::LocalAuth;
pub use pool::{Database, DbConfig};
pub use table::SqlTable;

/// Every table of the local database.
pub struct LocalStore {
    db: Database,
    products: SqlTable<Product>,
    customers: SqlTable<Customer>,
    sales: SqlTable<Sale>,
    sale_items: SqlTable<SaleItem>,
    alerts: SqlTable<Alert>,
    users: SqlTable<User>,
    payments: SqlTable<CreditPayment>,
    stock_movements: SqlTable<StockMovement>,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        let pool = db.pool().clone();
        LocalStore {
            products: SqlTable::new(pool.clone()),
            customers: SqlTable::new(pool.clone()),
            sales: SqlTable::new(pool.clone()),
            sale_items: SqlTable::new(pool.clone()),
            alerts: SqlTable::new(pool.clone()),
            users: SqlTable::new(pool.clone()),
            payments: SqlTable::new(pool.clone()),
            stock_movements: SqlTable::new(pool),
            db,
        }
    }

    /// Opens an in-memory store with the schema applied.
    pub async fn in_memory() -> crate::StoreResult<Self> {
        Ok(LocalStore::new(Database::new(DbConfig::in_memory()).await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl Store for LocalStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn products(&self) -> &dyn Table<Product> {
        &self.products
    }

    fn customers(&self) -> &dyn Table<Customer> {
        &self.customers
    }

    fn sales(&self) -> &dyn Table<Sale> {
        &self.sales
    }

    fn sale_items(&self) -> &dyn Table<SaleItem> {
        &self.sale_items
    }

    fn alerts(&self) -> &dyn Table<Alert> {
        &self.alerts
    }

    fn users(&self) -> &dyn Table<User> {
        &self.users
    }

    fn payments(&self) -> &dyn Table<CreditPayment> {
        &self.payments
    }

    fn stock_movements(&self) -> &dyn Table<StockMovement> {
        &self.stock_movements
    }

    async fn health_check(&self) -> bool {
        self.db.health_check().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::table::Ordering;
    use chrono::{Duration, Utc};
    use nexo_core::{
        AlertPatch, AlertSeverity, AlertType, Money, NewAlert, NewCustomer, NewProduct, NewSale,
        NewSaleItem, PaymentMethod, ProductPatch, SaleStatus,
    };

    fn new_product(name: &str, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            barcode: Some("7801234567890".to_string()),
            category: "Abarrotes".to_string(),
            current_stock: stock,
            min_stock: 5,
            max_stock: 50,
            unit_price: Money::from_pesos(1_990),
            cost_price: Money::from_pesos(1_200),
            supplier: None,
            expiry_date: Some(Utc::now() + Duration::days(10)),
        }
    }

    #[tokio::test]
    async fn test_product_crud() {
        let store = LocalStore::in_memory().await.unwrap();

        let created = store
            .products()
            .create(new_product("Arroz 1kg", 20))
            .await
            .unwrap();
        assert_eq!(created.id.len(), 12);

        let fetched = store.products().get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Arroz 1kg");
        assert_eq!(fetched.unit_price, Money::from_pesos(1_990));
        assert!(fetched.expiry_date.is_some());

        let updated = store
            .products()
            .update(&created.id, ProductPatch::stock(3))
            .await
            .unwrap();
        assert_eq!(updated.current_stock, 3);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(
            store.products().require(&created.id).await.unwrap().current_stock,
            3
        );

        store.products().delete(&created.id).await.unwrap();
        assert!(store.products().get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_records() {
        let store = LocalStore::in_memory().await.unwrap();

        let err = store
            .products()
            .update("nope", ProductPatch::stock(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store.customers().delete("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store.alerts().require("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Alert not found: nope");
    }

    #[tokio::test]
    async fn test_list_ordering() {
        let store = LocalStore::in_memory().await.unwrap();
        for name in ["Bebida", "Azúcar", "Café"] {
            store.products().create(new_product(name, 10)).await.unwrap();
        }

        let by_name = store.products().list(Ordering::asc("name")).await.unwrap();
        let names: Vec<&str> = by_name.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Azúcar", "Bebida", "Café"]);

        let err = store
            .products()
            .list(Ordering::asc("cost_price"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidOrdering { .. }));
    }

    #[tokio::test]
    async fn test_sale_items_cascade_with_sale() {
        let store = LocalStore::in_memory().await.unwrap();
        let sale = store
            .sales()
            .create(NewSale {
                sale_date: Utc::now(),
                total_amount: Money::from_pesos(3_980),
                payment_method: PaymentMethod::Cash,
                customer_id: None,
                customer_name: None,
                status: SaleStatus::Completed,
                notes: None,
            })
            .await
            .unwrap();
        store
            .sale_items()
            .create(NewSaleItem {
                sale_id: sale.id.clone(),
                product_id: "p1".to_string(),
                product_name: "Arroz 1kg".to_string(),
                quantity: 2,
                unit_price: Money::from_pesos(1_990),
                subtotal: Money::from_pesos(3_980),
            })
            .await
            .unwrap();

        let items = store
            .sale_items()
            .find_by("sale_id", &sale.id, Ordering::asc("created_at"))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);

        store.sales().delete(&sale.id).await.unwrap();
        assert!(store.sale_items().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_rejects_unknown_column() {
        let store = LocalStore::in_memory().await.unwrap();
        let result = store
            .sale_items()
            .find_by("product_name", "x", Ordering::asc("created_at"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_alert_type_column_roundtrip() {
        let store = LocalStore::in_memory().await.unwrap();
        let alert = store
            .alerts()
            .create(NewAlert {
                alert_type: AlertType::LowStock,
                severity: AlertSeverity::Medium,
                message: "Pan Blanco tiene stock bajo (8 unidades)".to_string(),
                related_id: Some("p1".to_string()),
                is_read: false,
            })
            .await
            .unwrap();

        let read = store.alerts().update(&alert.id, AlertPatch::read()).await.unwrap();
        assert!(read.is_read);

        let stored = store.alerts().require(&alert.id).await.unwrap();
        assert_eq!(stored.alert_type, AlertType::LowStock);
        assert!(stored.is_read);
    }

    #[tokio::test]
    async fn test_customer_money_columns() {
        let store = LocalStore::in_memory().await.unwrap();
        let customer = store
            .customers()
            .create(NewCustomer {
                name: "María González".to_string(),
                phone: None,
                email: None,
                address: None,
                credit_limit: Money::from_pesos(500_000),
                current_debt: Money::from_pesos(150_000),
            })
            .await
            .unwrap();

        let stored = store.customers().require(&customer.id).await.unwrap();
        assert_eq!(stored.available_credit(), Money::from_pesos(350_000));
        assert!(store.health_check().await);
        assert_eq!(store.kind(), BackendKind::Local);
    }
}
