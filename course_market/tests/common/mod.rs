// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use std::sync::Arc;

use course_market::config::AppConfig;
use course_market::services::{signature, FakeGateway, PaymentConfirmation};
use course_market::store::MemoryStore;
use course_market::AppState;
use once_cell::sync::Lazy;
use tracing::Level;
use uuid::Uuid;

/// Major-unit price used across the scenarios.
pub const COURSE_PRICE: i64 = 499;

pub struct Harness {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
  pub gateway: Arc<FakeGateway>,
  pub config: Arc<AppConfig>,
}

impl Harness {
  pub fn new() -> Self {
    setup_tracing();
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(FakeGateway::new(config.gateway.credentials.clone()));
    let state = AppState::assemble(config.clone(), store.clone(), store.clone(), gateway.clone());
    Self {
      state,
      store,
      gateway,
      config,
    }
  }

  pub fn secret(&self) -> &str {
    &self.config.gateway.credentials.key_secret
  }

  /// A confirmation for `(gateway_order_id, payment_id)` signed with the service's secret.
  pub fn signed(&self, gateway_order_id: &str, payment_id: &str) -> PaymentConfirmation {
    PaymentConfirmation {
      gateway_order_id: gateway_order_id.to_string(),
      gateway_payment_id: payment_id.to_string(),
      gateway_signature: signature::sign(gateway_order_id, payment_id, self.secret()),
    }
  }

  /// Opens an order and pays it through the fake gateway.
  pub async fn buy(&self, user_id: Uuid, course_id: Uuid) -> PaymentConfirmation {
    let order = self
      .state
      .ledger
      .create_order(user_id, course_id, COURSE_PRICE, "INR")
      .await
      .expect("order creation should succeed");
    let confirmation = self
      .gateway
      .settle(&order.gateway_order_id)
      .expect("fake gateway issued this order");
    self
      .state
      .recorder
      .confirm_payment(&confirmation)
      .await
      .expect("confirmation should succeed");
    confirmation
  }
}

pub fn test_config() -> Arc<AppConfig> {
  Arc::new(
    AppConfig::from_lookup(|name| match name {
      "STORE_BACKEND" => Some("memory".to_string()),
      "PAYMENT_GATEWAY" => Some("fake".to_string()),
      "RAZORPAY_KEY_SECRET" => Some("integration_test_secret".to_string()),
      _ => None,
    })
    .expect("test configuration is valid"),
  )
}

/// Flips one hex digit of a signature.
pub fn tamper(signature: &str) -> String {
  let mut chars: Vec<char> = signature.chars().collect();
  chars[0] = if chars[0] == '0' { '1' } else { '0' };
  chars.into_iter().collect()
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
