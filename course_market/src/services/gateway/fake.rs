// course_market/src/services/gateway/fake.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{info, instrument};

use crate::config::PaymentCredentials;
use crate::errors::{AppError, Result};
use crate::services::gateway::{PaymentConfirmation, PaymentGateway, RemoteOrder};
use crate::services::signature;

/// In-process gateway. Issues `go_1`, `go_2`, ... and settles payments as
/// `pay_1`, `pay_2`, ..., signing them with the configured secret exactly as
/// the real gateway would.
pub struct FakeGateway {
  credentials: PaymentCredentials,
  next_order: AtomicU64,
  next_payment: AtomicU64,
  calls: AtomicUsize,
  unavailable: AtomicBool,
  orders: Mutex<HashMap<String, (RemoteOrder, String)>>,
}

impl FakeGateway {
  pub fn new(credentials: PaymentCredentials) -> Self {
    Self {
      credentials,
      next_order: AtomicU64::new(1),
      next_payment: AtomicU64::new(1),
      calls: AtomicUsize::new(0),
      unavailable: AtomicBool::new(false),
      orders: Mutex::new(HashMap::new()),
    }
  }

  /// Number of `create_remote_order` calls received, including failed ones.
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  /// While set, order creation fails as if the gateway were unreachable.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }

  /// The remote order and receipt reference recorded for `gateway_order_id`.
  pub fn remote_order(&self, gateway_order_id: &str) -> Option<(RemoteOrder, String)> {
    self.orders.lock().get(gateway_order_id).cloned()
  }

  /// Simulates the customer paying: returns the signed confirmation the
  /// checkout widget would hand back. `None` for orders this gateway never issued.
  pub fn settle(&self, gateway_order_id: &str) -> Option<PaymentConfirmation> {
    if !self.orders.lock().contains_key(gateway_order_id) {
      return None;
    }
    let gateway_payment_id = format!("pay_{}", self.next_payment.fetch_add(1, Ordering::SeqCst));
    let gateway_signature = signature::sign(gateway_order_id, &gateway_payment_id, &self.credentials.key_secret);
    Some(PaymentConfirmation {
      gateway_order_id: gateway_order_id.to_string(),
      gateway_payment_id,
      gateway_signature,
    })
  }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
  #[instrument(name = "fake_gateway::create_order", skip(self), err(Display))]
  async fn create_remote_order(
    &self,
    amount_minor_units: i64,
    currency: &str,
    receipt_ref: &str,
  ) -> Result<RemoteOrder> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.unavailable.load(Ordering::SeqCst) {
      return Err(AppError::Gateway("fake gateway is unavailable".to_string()));
    }
    if amount_minor_units <= 0 {
      return Err(AppError::Gateway("amount must be greater than zero".to_string()));
    }

    let order = RemoteOrder {
      gateway_order_id: format!("go_{}", self.next_order.fetch_add(1, Ordering::SeqCst)),
      amount: amount_minor_units,
      currency: currency.to_string(),
    };
    self
      .orders
      .lock()
      .insert(order.gateway_order_id.clone(), (order.clone(), receipt_ref.to_string()));
    info!(gateway_order_id = %order.gateway_order_id, "Simulated remote order created.");
    Ok(order)
  }

  fn key_id(&self) -> &str {
    &self.credentials.key_id
  }

  fn name(&self) -> &'static str {
    "fake"
  }
}
