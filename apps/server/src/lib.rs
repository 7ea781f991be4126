//! # NEXOVENTIS Server Library
//!
//! Services and HTTP command surface for the NEXOVENTIS point of sale.
//! `main.rs` only loads configuration, builds the state and serves
//! [`router`].
//!
//! ## Module Organization
//! ```text
//! nexo_server/
//! ├── lib.rs          ◄─── You are here (module wiring, router)
//! ├── config.rs       ◄─── Layered configuration (defaults → file → env)
//! ├── error.rs        ◄─── API error type and failure envelope
//! ├── extract.rs      ◄─── Session + envelope-aware JSON/Query/Path
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState, startup sequence
//! │   └── cart.rs     ◄─── Per-session carts
//! ├── services/
//! │   ├── alerts.rs   ◄─── Alert generator runs, read flags
//! │   ├── auth.rs     ◄─── Login, logout, register
//! │   ├── customers.rs◄─── Customers, credit payments
//! │   ├── inventory.rs◄─── Products, stock adjustments
//! │   ├── reports.rs  ◄─── Dashboard, daily summary
//! │   ├── sales.rs    ◄─── Cart operations, checkout saga
//! │   └── users.rs    ◄─── User administration
//! └── commands/       ◄─── axum handlers, one file per resource
//! ```
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP request                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  commands/*  (extract Session, JSON body, path, query)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  services/*  (authorize, validate, write, re-run alerts)                 │
//! │       │                                                                 │
//! │       ├──► nexo-core   rules: cart, checkout plan, alerts, reports      │
//! │       └──► nexo-store  &dyn Store: local SQLite | hosted REST           │
//! │                                                                         │
//! │  ApiResult<T> ──► { success: true, data } | { success: false, error }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod services;
pub mod state;

pub use commands::router;
pub use config::AppConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppState, SharedState};
