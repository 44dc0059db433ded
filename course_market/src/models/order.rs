// course_market/src/models/order.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

/// Lifecycle of a purchase attempt. `Paid` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Created,
  Paid,
  Failed,
}

impl OrderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Created => "created",
      OrderStatus::Paid => "paid",
      OrderStatus::Failed => "failed",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub course_id: Uuid,
  pub user_id: Uuid,
  /// Currency-major units (whole rupees).
  pub amount: i64,
  pub currency: String,
  pub gateway_order_id: String,
  pub gateway_payment_id: Option<String>,
  #[serde(skip_serializing)]
  pub gateway_signature: Option<String>,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// The amount in minor units, as sent to and acknowledged by the gateway.
  pub fn amount_minor_units(&self) -> i64 {
    self.amount.saturating_mul(crate::services::order_ledger::MINOR_UNITS_PER_MAJOR)
  }
}

/// Payment details recorded on an order when it transitions to `paid`.
#[derive(Debug, Clone, Copy)]
pub struct PaymentProof<'a> {
  pub payment_id: &'a str,
  pub signature: &'a str,
}
