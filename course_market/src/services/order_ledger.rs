// course_market/src/services/order_ledger.rs

//! One `Order` per purchase attempt. The ledger is the only component that
//! writes order status, and it owns the gateway client.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus, PaymentProof};
use crate::services::entitlements::EntitlementService;
use crate::services::gateway::PaymentGateway;
use crate::store::{OrderStore, Transition};

/// Minor units per major unit (paise per rupee).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

#[derive(Clone)]
pub struct OrderLedger {
  orders: Arc<dyn OrderStore>,
  entitlements: EntitlementService,
  gateway: Arc<dyn PaymentGateway>,
}

impl OrderLedger {
  pub fn new(orders: Arc<dyn OrderStore>, entitlements: EntitlementService, gateway: Arc<dyn PaymentGateway>) -> Self {
    Self {
      orders,
      entitlements,
      gateway,
    }
  }

  pub fn gateway_key_id(&self) -> &str {
    self.gateway.key_id()
  }

  /// Opens a purchase attempt. Ownership is re-checked here on every call, before
  /// the gateway is contacted, so retrying after a partial failure is safe.
  #[instrument(name = "ledger::create_order", skip(self), err(Display))]
  pub async fn create_order(&self, user_id: Uuid, course_id: Uuid, amount: i64, currency: &str) -> Result<Order> {
    if self.entitlements.has_purchased(user_id, course_id).await? {
      info!("Course already owned, refusing to open a new order.");
      return Err(AppError::AlreadyPurchased { user_id, course_id });
    }
    if amount <= 0 {
      return Err(AppError::Validation("Amount must be greater than zero".to_string()));
    }
    let amount_minor = amount
      .checked_mul(MINOR_UNITS_PER_MAJOR)
      .ok_or_else(|| AppError::Validation(format!("Amount {} is too large", amount)))?;

    let id = Uuid::new_v4();
    let receipt_ref = format!("rcpt_{}", id.simple());
    let remote = self.gateway.create_remote_order(amount_minor, currency, &receipt_ref).await?;
    // The create response echoes the gateway's amount, so it must be the one we asked for.
    if remote.amount != amount_minor || !remote.currency.eq_ignore_ascii_case(currency) {
      warn!(
        gateway_order_id = %remote.gateway_order_id,
        requested_amount = amount_minor,
        echoed_amount = remote.amount,
        echoed_currency = %remote.currency,
        "Gateway acknowledged a different amount or currency; order not recorded."
      );
      return Err(AppError::Gateway(format!(
        "gateway order '{}' echoed {} {} for a request of {} {}",
        remote.gateway_order_id, remote.amount, remote.currency, amount_minor, currency
      )));
    }

    let now = Utc::now();
    let order = Order {
      id,
      course_id,
      user_id,
      amount,
      currency: remote.currency,
      gateway_order_id: remote.gateway_order_id,
      gateway_payment_id: None,
      gateway_signature: None,
      status: OrderStatus::Created,
      created_at: now,
      updated_at: now,
    };
    self.orders.insert_order(&order).await?;
    info!(order_id = %order.id, gateway_order_id = %order.gateway_order_id, amount_minor, "Order created.");
    Ok(order)
  }

  pub async fn find_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>> {
    self.orders.find_by_gateway_order_id(gateway_order_id).await
  }

  /// `created -> paid`. An order that is already paid is returned as stored.
  #[instrument(name = "ledger::mark_paid", skip(self, signature), err(Display))]
  pub async fn mark_paid(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> Result<Order> {
    let proof = PaymentProof { payment_id, signature };
    match self
      .orders
      .transition_from_created(gateway_order_id, OrderStatus::Paid, Some(proof))
      .await?
    {
      Transition::Applied(order) => {
        info!(order_id = %order.id, "Order marked paid.");
        Ok(order)
      }
      Transition::Unchanged(order) if order.status == OrderStatus::Paid => {
        if order.gateway_payment_id.as_deref() != Some(payment_id) {
          warn!(
            recorded_payment_id = ?order.gateway_payment_id,
            "Order already paid under a different payment id; keeping the first."
          );
        }
        Ok(order)
      }
      Transition::Unchanged(order) => Err(AppError::OrderClosed {
        gateway_order_id: gateway_order_id.to_string(),
        status: order.status,
      }),
      Transition::Missing => Err(AppError::OrderNotFound(gateway_order_id.to_string())),
    }
  }

  /// `created -> failed`, on a failure reported by the gateway.
  #[instrument(name = "ledger::mark_failed", skip(self), err(Display))]
  pub async fn mark_failed(&self, gateway_order_id: &str) -> Result<Order> {
    match self
      .orders
      .transition_from_created(gateway_order_id, OrderStatus::Failed, None)
      .await?
    {
      Transition::Applied(order) => {
        info!(order_id = %order.id, "Order marked failed.");
        Ok(order)
      }
      Transition::Unchanged(order) if order.status == OrderStatus::Failed => Ok(order),
      Transition::Unchanged(order) => Err(AppError::OrderClosed {
        gateway_order_id: gateway_order_id.to_string(),
        status: order.status,
      }),
      Transition::Missing => Err(AppError::OrderNotFound(gateway_order_id.to_string())),
    }
  }

  pub async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    self.orders.orders_for_user(user_id).await
  }
}
