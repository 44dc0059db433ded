// course_market/src/models/mod.rs

//! Contains data structures representing database entities.

pub mod order;
pub mod purchase;

pub use order::{Order, OrderStatus, PaymentProof};
pub use purchase::Purchase;
