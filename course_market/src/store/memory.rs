// course_market/src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus, PaymentProof, Purchase};
use crate::store::{OrderStore, PurchaseInsert, PurchaseStore, Transition};

#[derive(Default)]
struct Tables {
  // Keyed by gateway order id, mirroring the unique index.
  orders: HashMap<String, Order>,
  purchases: HashMap<(Uuid, Uuid), Purchase>,
}

/// Process-local store for development and tests.
///
/// Every check-and-write happens under one write lock, so the uniqueness
/// guarantees match the PostgreSQL store. Guards are never held across `.await`.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn order_count(&self) -> usize {
    self.tables.read().orders.len()
  }

  pub fn purchase_count(&self) -> usize {
    self.tables.read().purchases.len()
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert_order(&self, order: &Order) -> Result<()> {
    let mut tables = self.tables.write();
    if tables.orders.contains_key(&order.gateway_order_id) {
      return Err(AppError::Internal(format!(
        "duplicate gateway order id '{}'",
        order.gateway_order_id
      )));
    }
    tables.orders.insert(order.gateway_order_id.clone(), order.clone());
    Ok(())
  }

  async fn find_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.get(gateway_order_id).cloned())
  }

  async fn transition_from_created(
    &self,
    gateway_order_id: &str,
    to: OrderStatus,
    proof: Option<PaymentProof<'_>>,
  ) -> Result<Transition> {
    let mut tables = self.tables.write();
    let Some(order) = tables.orders.get_mut(gateway_order_id) else {
      return Ok(Transition::Missing);
    };
    if order.status != OrderStatus::Created {
      return Ok(Transition::Unchanged(order.clone()));
    }
    order.status = to;
    if let Some(proof) = proof {
      order.gateway_payment_id = Some(proof.payment_id.to_string());
      order.gateway_signature = Some(proof.signature.to_string());
    }
    order.updated_at = Utc::now();
    Ok(Transition::Applied(order.clone()))
  }

  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let mut orders: Vec<Order> = self
      .tables
      .read()
      .orders
      .values()
      .filter(|o| o.user_id == user_id)
      .cloned()
      .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }
}

#[async_trait]
impl PurchaseStore for MemoryStore {
  async fn insert_purchase(&self, purchase: &Purchase) -> Result<PurchaseInsert> {
    let mut tables = self.tables.write();
    let key = (purchase.user_id, purchase.course_id);
    if tables.purchases.contains_key(&key) {
      return Ok(PurchaseInsert::Duplicate);
    }
    tables.purchases.insert(key, purchase.clone());
    Ok(PurchaseInsert::Inserted(purchase.clone()))
  }

  async fn find_purchase(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Purchase>> {
    Ok(self.tables.read().purchases.get(&(user_id, course_id)).cloned())
  }

  async fn purchased_course_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
    let tables = self.tables.read();
    let mut owned: Vec<&Purchase> = tables.purchases.values().filter(|p| p.user_id == user_id).collect();
    owned.sort_by_key(|p| p.created_at);
    Ok(owned.into_iter().map(|p| p.course_id).collect())
  }
}
