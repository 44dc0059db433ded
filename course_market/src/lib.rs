// course_market/src/lib.rs

//! Purchase and payment reconciliation for the course marketplace.
//!
//! A purchase runs in two halves: [`services::OrderLedger::create_order`] opens
//! a gateway order, and [`services::PurchaseRecorder::confirm_payment`] turns
//! the gateway's signed confirmation into a permanent [`models::Purchase`].
//! [`services::EntitlementService`] answers ownership questions for the rest of
//! the marketplace.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use errors::{AppError, Result};
pub use state::AppState;
