// course_market/src/store/mod.rs

//! Persistence capabilities for orders and purchases.
//!
//! Both implementations enforce the same constraints atomically: one order per
//! gateway order id, one purchase per (user, course), and order status changes
//! only out of `created`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Order, OrderStatus, PaymentProof, Purchase};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Outcome of a conditional `created -> *` status update.
#[derive(Debug, Clone)]
pub enum Transition {
  /// The order was in `created` and now carries the new status.
  Applied(Order),
  /// The order exists but had already left `created`; returned as stored.
  Unchanged(Order),
  Missing,
}

/// Outcome of a purchase insert guarded by the (user, course) uniqueness constraint.
#[derive(Debug, Clone)]
pub enum PurchaseInsert {
  Inserted(Purchase),
  Duplicate,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert_order(&self, order: &Order) -> Result<()>;

  async fn find_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>>;

  /// Moves an order out of `created`. `proof` is recorded when present.
  async fn transition_from_created(
    &self,
    gateway_order_id: &str,
    to: OrderStatus,
    proof: Option<PaymentProof<'_>>,
  ) -> Result<Transition>;

  /// Newest first.
  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait PurchaseStore: Send + Sync {
  async fn insert_purchase(&self, purchase: &Purchase) -> Result<PurchaseInsert>;

  async fn find_purchase(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Purchase>>;

  async fn purchased_course_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;
}
