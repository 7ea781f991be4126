//! # Table Contract
//!
//! The uniform per-entity interface every backend implements.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  services (apps/server)                                                │
//! │       │  store.products().update(id, patch)                            │
//! │       ▼                                                                 │
//! │  &dyn Table<Product>                                                   │
//! │       │                                                                 │
//! │       ├── SqlTable<Product>     (local/table.rs)  → SQLite             │
//! │       └── RemoteTable<Product>  (remote/table.rs) → /rest/v1/products  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Entity` carries the per-type knowledge (table name, how to build a
//! record from its creation payload, how to apply a patch, which columns
//! may be used for ordering and lookups). Both backends are generic over it.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use nexo_core::{
    Alert, AlertPatch, CreditPayment, CreditPaymentPatch, Customer, CustomerPatch, NewAlert,
    NewCreditPayment, NewCustomer, NewProduct, NewSale, NewSaleItem, NewStockMovement, NewUser,
    Product, ProductPatch, Sale, SaleItem, SaleItemPatch, SalePatch, StockMovement,
    StockMovementPatch, User, UserPatch,
};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Ordering
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    pub fn as_rest(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Column plus direction used when listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub column: &'static str,
    pub direction: Direction,
}

impl Ordering {
    pub const fn desc(column: &'static str) -> Self {
        Ordering {
            column,
            direction: Direction::Desc,
        }
    }

    pub const fn asc(column: &'static str) -> Self {
        Ordering {
            column,
            direction: Direction::Asc,
        }
    }

    /// Rejects columns the entity does not list in `ORDER_COLUMNS`.
    pub fn check<E: Entity>(&self) -> StoreResult<()> {
        if E::ORDER_COLUMNS.contains(&self.column) {
            Ok(())
        } else {
            Err(StoreError::InvalidOrdering {
                table: E::TABLE.to_string(),
                column: self.column.to_string(),
            })
        }
    }
}

/// Rejects lookup columns the entity does not list in `FILTER_COLUMNS`.
pub(crate) fn check_filter<E: Entity>(column: &str) -> StoreResult<()> {
    if E::FILTER_COLUMNS.contains(&column) {
        Ok(())
    } else {
        Err(StoreError::QueryFailed(format!(
            "{} cannot be filtered by '{column}'",
            E::TABLE
        )))
    }
}

// =============================================================================
// Entity
// =============================================================================

/// A record type persisted in its own table.
pub trait Entity:
    Clone + Send + Sync + Unpin + Serialize + DeserializeOwned + fmt::Debug + 'static
{
    /// Creation payload.
    type New: Clone + Send + Sync + Serialize + fmt::Debug + 'static;
    /// Partial update payload.
    type Patch: Clone + Send + Sync + Serialize + fmt::Debug + 'static;

    const TABLE: &'static str;
    /// Human-readable name used in `NotFound` errors.
    const LABEL: &'static str;
    const DEFAULT_ORDER: Ordering = Ordering::desc("created_at");
    const ORDER_COLUMNS: &'static [&'static str];
    const FILTER_COLUMNS: &'static [&'static str] = &[];

    fn id(&self) -> &str;

    /// Builds the stored record. `id` is freshly generated; entities that
    /// carry their own identity in `new` may prefer it.
    fn build(id: String, new: Self::New, now: DateTime<Utc>) -> Self;

    /// Applies a patch in place, bumping `updated_at` where the entity has one.
    fn apply(&mut self, patch: &Self::Patch, now: DateTime<Utc>);
}

impl Entity for Product {
    type New = NewProduct;
    type Patch = ProductPatch;

    const TABLE: &'static str = "products";
    const LABEL: &'static str = "Product";
    const ORDER_COLUMNS: &'static [&'static str] =
        &["created_at", "updated_at", "name", "category", "current_stock"];
    const FILTER_COLUMNS: &'static [&'static str] = &["category", "barcode"];

    fn id(&self) -> &str {
        &self.id
    }

    fn build(id: String, new: NewProduct, now: DateTime<Utc>) -> Self {
        Product::from_new(id, new, now)
    }

    fn apply(&mut self, patch: &ProductPatch, now: DateTime<Utc>) {
        patch.apply(self);
        self.updated_at = now;
    }
}

impl Entity for Customer {
    type New = NewCustomer;
    type Patch = CustomerPatch;

    const TABLE: &'static str = "customers";
    const LABEL: &'static str = "Customer";
    const ORDER_COLUMNS: &'static [&'static str] =
        &["created_at", "updated_at", "name", "current_debt"];

    fn id(&self) -> &str {
        &self.id
    }

    fn build(id: String, new: NewCustomer, now: DateTime<Utc>) -> Self {
        Customer::from_new(id, new, now)
    }

    fn apply(&mut self, patch: &CustomerPatch, now: DateTime<Utc>) {
        patch.apply(self);
        self.updated_at = now;
    }
}

impl Entity for Sale {
    type New = NewSale;
    type Patch = SalePatch;

    const TABLE: &'static str = "sales";
    const LABEL: &'static str = "Sale";
    const DEFAULT_ORDER: Ordering = Ordering::desc("sale_date");
    const ORDER_COLUMNS: &'static [&'static str] = &["sale_date", "created_at", "total_amount"];
    const FILTER_COLUMNS: &'static [&'static str] = &["customer_id", "status", "payment_method"];

    fn id(&self) -> &str {
        &self.id
    }

    fn build(id: String, new: NewSale, now: DateTime<Utc>) -> Self {
        Sale::from_new(id, new, now)
    }

    fn apply(&mut self, patch: &SalePatch, _now: DateTime<Utc>) {
        patch.apply(self);
    }
}

impl Entity for SaleItem {
    type New = NewSaleItem;
    type Patch = SaleItemPatch;

    const TABLE: &'static str = "sale_items";
    const LABEL: &'static str = "Sale item";
    const DEFAULT_ORDER: Ordering = Ordering::asc("created_at");
    const ORDER_COLUMNS: &'static [&'static str] = &["created_at"];
    const FILTER_COLUMNS: &'static [&'static str] = &["sale_id", "product_id"];

    fn id(&self) -> &str {
        &self.id
    }

    fn build(id: String, new: NewSaleItem, now: DateTime<Utc>) -> Self {
        SaleItem::from_new(id, new, now)
    }

    fn apply(&mut self, patch: &SaleItemPatch, _now: DateTime<Utc>) {
        patch.apply(self);
    }
}

impl Entity for Alert {
    type New = NewAlert;
    type Patch = AlertPatch;

    const TABLE: &'static str = "alerts";
    const LABEL: &'static str = "Alert";
    const ORDER_COLUMNS: &'static [&'static str] = &["created_at"];
    const FILTER_COLUMNS: &'static [&'static str] = &["related_id"];

    fn id(&self) -> &str {
        &self.id
    }

    fn build(id: String, new: NewAlert, now: DateTime<Utc>) -> Self {
        Alert::from_new(id, new, now)
    }

    fn apply(&mut self, patch: &AlertPatch, _now: DateTime<Utc>) {
        patch.apply(self);
    }
}

impl Entity for User {
    type New = NewUser;
    type Patch = UserPatch;

    const TABLE: &'static str = "users";
    const LABEL: &'static str = "User";
    const ORDER_COLUMNS: &'static [&'static str] = &["created_at", "email", "full_name"];
    const FILTER_COLUMNS: &'static [&'static str] = &["email"];

    fn id(&self) -> &str {
        &self.id
    }

    /// Keeps the id assigned by the auth backend when there is one.
    fn build(id: String, new: NewUser, now: DateTime<Utc>) -> Self {
        let id = new.id.clone().unwrap_or(id);
        User::from_new(id, new, now)
    }

    fn apply(&mut self, patch: &UserPatch, now: DateTime<Utc>) {
        patch.apply(self);
        self.updated_at = now;
    }
}

impl Entity for CreditPayment {
    type New = NewCreditPayment;
    type Patch = CreditPaymentPatch;

    const TABLE: &'static str = "credit_payments";
    const LABEL: &'static str = "Payment";
    const DEFAULT_ORDER: Ordering = Ordering::desc("payment_date");
    const ORDER_COLUMNS: &'static [&'static str] = &["payment_date", "created_at", "amount"];
    const FILTER_COLUMNS: &'static [&'static str] = &["customer_id"];

    fn id(&self) -> &str {
        &self.id
    }

    fn build(id: String, new: NewCreditPayment, now: DateTime<Utc>) -> Self {
        CreditPayment::from_new(id, new, now)
    }

    fn apply(&mut self, patch: &CreditPaymentPatch, _now: DateTime<Utc>) {
        patch.apply(self);
    }
}

impl Entity for StockMovement {
    type New = NewStockMovement;
    type Patch = StockMovementPatch;

    const TABLE: &'static str = "stock_movements";
    const LABEL: &'static str = "Stock movement";
    const DEFAULT_ORDER: Ordering = Ordering::desc("date");
    const ORDER_COLUMNS: &'static [&'static str] = &["date", "created_at"];
    const FILTER_COLUMNS: &'static [&'static str] = &["product_id"];

    fn id(&self) -> &str {
        &self.id
    }

    fn build(id: String, new: NewStockMovement, now: DateTime<Utc>) -> Self {
        StockMovement::from_new(id, new, now)
    }

    fn apply(&mut self, patch: &StockMovementPatch, _now: DateTime<Utc>) {
        patch.apply(self);
    }
}

// =============================================================================
// Table / Store
// =============================================================================

/// CRUD access to one entity's table.
#[async_trait]
pub trait Table<E: Entity>: Send + Sync {
    /// Every record, in the given order.
    async fn list(&self, ordering: Ordering) -> StoreResult<Vec<E>>;

    async fn get(&self, id: &str) -> StoreResult<Option<E>>;

    /// Records whose `column` equals `value`. Only `FILTER_COLUMNS` are
    /// accepted.
    async fn find_by(&self, column: &str, value: &str, ordering: Ordering) -> StoreResult<Vec<E>>;

    /// Inserts a new record and returns it as stored.
    async fn create(&self, new: E::New) -> StoreResult<E>;

    /// Applies a partial update; `NotFound` when the record does not exist.
    async fn update(&self, id: &str, patch: E::Patch) -> StoreResult<E>;

    /// Removes a record; `NotFound` when nothing was deleted.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Every record in the entity's default order.
    async fn all(&self) -> StoreResult<Vec<E>> {
        self.list(E::DEFAULT_ORDER).await
    }

    /// Like [`Table::get`], but missing records are an error.
    async fn require(&self, id: &str) -> StoreResult<E> {
        self.get(id)
            .await?
            .ok_or_else(|| StoreError::not_found(E::LABEL, id))
    }
}

/// Which backend is serving the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => f.write_str("local"),
            BackendKind::Remote => f.write_str("remote"),
        }
    }
}

/// All tables of one backend, as seen by one caller.
#[async_trait]
pub trait Store: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn products(&self) -> &dyn Table<Product>;
    fn customers(&self) -> &dyn Table<Customer>;
    fn sales(&self) -> &dyn Table<Sale>;
    fn sale_items(&self) -> &dyn Table<SaleItem>;
    fn alerts(&self) -> &dyn Table<Alert>;
    fn users(&self) -> &dyn Table<User>;
    fn payments(&self) -> &dyn Table<CreditPayment>;
    fn stock_movements(&self) -> &dyn Table<StockMovement>;

    /// True when the backend answers a trivial request.
    async fn health_check(&self) -> bool;
}
