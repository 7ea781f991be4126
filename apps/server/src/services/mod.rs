//! # Services
//!
//! Orchestration between the HTTP commands and the backing store. Every
//! service takes the caller's `Store` explicitly; nothing reaches for a
//! global.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commands/*  ──►  services/*  ──►  nexo-core (rules, policy)            │
//! │                        │                                                │
//! │                        └────────►  &dyn Store (local | hosted)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutating calls check `nexo_core::policy::authorize` before any write.

pub mod alerts;
pub mod auth;
pub mod customers;
pub mod inventory;
pub mod reports;
pub mod sales;
pub mod users;
