//! # HTTP Commands Module
//!
//! All commands exposed to the register frontend, mounted under `/api`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (router, success envelope)
//! ├── health.rs    ◄─── Liveness and backend kind (public)
//! ├── auth.rs      ◄─── Login, logout, session, register
//! ├── product.rs   ◄─── Product CRUD, categories, stock adjustments
//! ├── customer.rs  ◄─── Customer CRUD, credit payments
//! ├── cart.rs      ◄─── Cart manipulation
//! ├── sale.rs      ◄─── Checkout and sales history
//! ├── alert.rs     ◄─── Alert list and read flags
//! ├── user.rs      ◄─── User administration
//! └── report.rs    ◄─── Dashboard and daily summary
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    HTTP Command Flow                                    │
//! │                                                                         │
//! │  Frontend                                                               │
//! │  ────────                                                               │
//! │  fetch('/api/cart/items', {                                             │
//! │    method: 'POST',                                                      │
//! │    headers: { Authorization: 'Bearer <token>' },                        │
//! │    body: JSON.stringify({ product_id: 'xxx', quantity: 2 })             │
//! │  });                                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  async fn add_to_cart(                                                  │
//! │      State(state): State<SharedState>,   ◄── Shared state              │
//! │      session: Session,                   ◄── Bearer token resolved     │
//! │      ApiJson(body): ApiJson<AddToCart>,  ◄── JSON body                 │
//! │  ) -> ApiResult<Json<ApiResponse<CartSummary>>>                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  { "success": true, "data": { "lines": [...], "total": 4980, ... } }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod alert;
pub mod auth;
pub mod cart;
pub mod customer;
pub mod health;
pub mod product;
pub mod report;
pub mod sale;
pub mod user;

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::SharedState;

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Wraps `data` in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// Builds the `/api` router.
pub fn router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .route("/auth/register", post(auth::register))
        // Products
        .route("/products", get(product::list_products).post(product::add_product))
        .route("/products/categories", get(product::categories))
        .route(
            "/products/{id}",
            patch(product::update_product).delete(product::delete_product),
        )
        .route(
            "/products/{id}/stock",
            get(product::stock_history).post(product::adjust_stock),
        )
        // Customers
        .route(
            "/customers",
            get(customer::list_customers).post(customer::add_customer),
        )
        .route("/customers/{id}", patch(customer::update_customer))
        .route(
            "/customers/{id}/payments",
            get(customer::payment_history).post(customer::add_payment),
        )
        // Cart
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/cart/items", post(cart::add_to_cart))
        .route(
            "/cart/items/{product_id}",
            patch(cart::update_cart_item).delete(cart::remove_from_cart),
        )
        .route("/cart/checkout", post(sale::checkout))
        // Sales
        .route("/sales", get(sale::list_sales))
        .route("/sales/{id}/items", get(sale::sale_items))
        // Alerts
        .route("/alerts", get(alert::list_alerts))
        .route("/alerts/unread-count", get(alert::unread_count))
        .route("/alerts/read-all", post(alert::mark_all_read))
        .route("/alerts/refresh", post(alert::refresh))
        .route("/alerts/{id}/read", post(alert::mark_read))
        // Users
        .route("/users", get(user::list_users))
        .route("/users/{id}", patch(user::set_user_active))
        // Reports
        .route("/reports/dashboard", get(report::dashboard))
        .route("/reports/daily", get(report::daily))
        .route("/reports/recent", get(report::recent_sales));

    Router::new().nest("/api", api).with_state(state)
}
