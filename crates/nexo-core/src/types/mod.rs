//! # Domain Types
//!
//! Entity records shared by every layer of NEXOVENTIS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  current_stock  │   │  total_amount   │   │  credit_limit   │       │
//! │  │  min/max_stock  │   │  payment_method │   │  current_debt   │       │
//! │  │  unit_price     │   │  status         │   │                 │       │
//! │  │  expiry_date?   │   │  customer_id?   │   │                 │       │
//! │  └────────┬────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │           │                     │                     │                 │
//! │  ┌────────▼────────┐   ┌────────▼────────┐   ┌────────▼────────┐       │
//! │  │ StockMovement   │   │    SaleItem     │   │ CreditPayment   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │     Alert       │   │      User       │                              │
//! │  │ type+related_id │   │  role, active   │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Record / New / Patch
//! Every persisted entity comes in three shapes:
//! - the record itself (`Product`), with id and timestamps owned by the store
//! - a `New*` payload carrying the caller-supplied fields for `create`
//! - a `*Patch` with every field optional for `update`; `None` leaves the
//!   stored value untouched and is skipped when serialized

mod alert;
mod customer;
mod product;
mod sale;
mod user;

pub use alert::*;
pub use customer::*;
pub use product::*;
pub use sale::*;
pub use user::*;
