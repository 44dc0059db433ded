// course_market/src/services/gateway/mod.rs

//! Payment gateway capability and its two strategies.
//!
//! The strategy is picked from configuration (`PAYMENT_GATEWAY`), never by
//! looking at what the key id happens to contain.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{GatewayConfig, GatewayKind};
use crate::errors::Result;

pub mod fake;
pub mod razorpay;

pub use fake::FakeGateway;
pub use razorpay::RazorpayGateway;

/// An order as acknowledged by the gateway. `amount` is in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOrder {
  pub gateway_order_id: String,
  pub amount: i64,
  pub currency: String,
}

/// The signed confirmation a client or the gateway posts back after payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
  #[serde(alias = "razorpay_order_id")]
  pub gateway_order_id: String,
  #[serde(alias = "razorpay_payment_id")]
  pub gateway_payment_id: String,
  #[serde(alias = "razorpay_signature")]
  pub gateway_signature: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Opens an order on the gateway side. `receipt_ref` is our own reference, at most 40 chars.
  async fn create_remote_order(&self, amount_minor_units: i64, currency: &str, receipt_ref: &str)
    -> Result<RemoteOrder>;

  /// Public key id the checkout widget needs.
  fn key_id(&self) -> &str;

  fn name(&self) -> &'static str;
}

pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn PaymentGateway>> {
  let gateway: Arc<dyn PaymentGateway> = match config.kind {
    GatewayKind::Razorpay => Arc::new(RazorpayGateway::new(config)?),
    GatewayKind::Fake => {
      tracing::warn!("Using the in-process fake payment gateway; no money will move.");
      Arc::new(FakeGateway::new(config.credentials.clone()))
    }
  };
  tracing::info!(gateway = gateway.name(), key_id = gateway.key_id(), "Payment gateway ready.");
  Ok(gateway)
}
