//! # Remote Store
//!
//! Hosted REST store, reached with reqwest. Every table call is made on
//! behalf of an authenticated user and carries that user's token.

pub mod auth;
pub mod client;
pub mod table;

use std::sync::Arc;

use async_trait::async_trait;

use nexo_core::{Alert, CreditPayment, Customer, Product, Sale, SaleItem, StockMovement, User};

use crate::table::{BackendKind, Store, Table};

pub use auth::RemoteAuth;
pub use client::RestClient;
pub use table::RemoteTable;

/// Every table of the hosted store, bound to one caller's token.
pub struct RemoteStore {
    client: Arc<RestClient>,
    products: RemoteTable<Product>,
    customers: RemoteTable<Customer>,
    sales: RemoteTable<Sale>,
    sale_items: RemoteTable<SaleItem>,
    alerts: RemoteTable<Alert>,
    users: RemoteTable<User>,
    payments: RemoteTable<CreditPayment>,
    stock_movements: RemoteTable<StockMovement>,
}

impl RemoteStore {
    /// `token` is `None` for unauthenticated callers; their calls fail with
    /// `Unauthorized`.
    pub fn new(client: Arc<RestClient>, token: Option<String>) -> Self {
        RemoteStore {
            products: RemoteTable::new(client.clone(), token.clone()),
            customers: RemoteTable::new(client.clone(), token.clone()),
            sales: RemoteTable::new(client.clone(), token.clone()),
            sale_items: RemoteTable::new(client.clone(), token.clone()),
            alerts: RemoteTable::new(client.clone(), token.clone()),
            users: RemoteTable::new(client.clone(), token.clone()),
            payments: RemoteTable::new(client.clone(), token.clone()),
            stock_movements: RemoteTable::new(client.clone(), token),
            client,
        }
    }
}

#[async_trait]
impl Store for RemoteStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
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
        self.client.ping().await
    }
}
