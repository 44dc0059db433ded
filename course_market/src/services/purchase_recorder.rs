// course_market/src/services/purchase_recorder.rs

//! Turns a verified payment confirmation into a permanent `Purchase`.
//!
//! Safe under at-least-once and concurrent delivery: the purchase insert is
//! guarded by the store's (user, course) uniqueness constraint and a duplicate
//! is the success path.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::config::PaymentCredentials;
use crate::errors::{AppError, Result};
use crate::models::{OrderStatus, Purchase};
use crate::services::entitlements::EntitlementService;
use crate::services::gateway::PaymentConfirmation;
use crate::services::order_ledger::OrderLedger;
use crate::services::signature;
use crate::store::{PurchaseInsert, PurchaseStore};

#[derive(Clone)]
pub struct PurchaseRecorder {
  ledger: OrderLedger,
  entitlements: EntitlementService,
  purchases: Arc<dyn PurchaseStore>,
  credentials: PaymentCredentials,
}

impl PurchaseRecorder {
  pub fn new(
    ledger: OrderLedger,
    entitlements: EntitlementService,
    purchases: Arc<dyn PurchaseStore>,
    credentials: PaymentCredentials,
  ) -> Self {
    Self {
      ledger,
      entitlements,
      purchases,
      credentials,
    }
  }

  #[instrument(
    name = "recorder::confirm_payment",
    skip(self, confirmation),
    fields(
      gateway_order_id = %confirmation.gateway_order_id,
      gateway_payment_id = %confirmation.gateway_payment_id
    ),
    err(Display)
  )]
  pub async fn confirm_payment(&self, confirmation: &PaymentConfirmation) -> Result<Purchase> {
    let PaymentConfirmation {
      gateway_order_id,
      gateway_payment_id,
      gateway_signature,
    } = confirmation;

    if !signature::verify(
      gateway_order_id,
      gateway_payment_id,
      gateway_signature,
      &self.credentials.key_secret,
    ) {
      warn!(
        target: "payment_integrity",
        gateway_order_id = %gateway_order_id,
        gateway_payment_id = %gateway_payment_id,
        "Payment confirmation signature mismatch; possible tampering."
      );
      return Err(AppError::PaymentVerificationFailed {
        gateway_order_id: gateway_order_id.clone(),
      });
    }

    let order = self
      .ledger
      .find_by_gateway_order_id(gateway_order_id)
      .await?
      .ok_or_else(|| AppError::OrderNotFound(gateway_order_id.clone()))?;

    // A second order for a course the user already owns must not reach `paid`.
    // This is a read before the transition: two different orders for the same
    // course confirmed at the same moment can both end `paid`. The purchase
    // insert below still yields a single Purchase.
    if order.status == OrderStatus::Created && self.entitlements.has_purchased(order.user_id, order.course_id).await? {
      match self.ledger.mark_failed(gateway_order_id).await {
        Ok(_) => {
          error!(
            order_id = %order.id,
            user_id = %order.user_id,
            course_id = %order.course_id,
            "Payment captured for an already-owned course; order closed as failed and needs a refund."
          );
          return Err(AppError::AlreadyPurchased {
            user_id: order.user_id,
            course_id: order.course_id,
          });
        }
        // A concurrent delivery of this same confirmation paid the order first.
        Err(AppError::OrderClosed {
          status: OrderStatus::Paid,
          ..
        }) => {}
        Err(e) => return Err(e),
      }
    }

    let order = self
      .ledger
      .mark_paid(gateway_order_id, gateway_payment_id, gateway_signature)
      .await?;

    let candidate = Purchase::new(order.user_id, order.course_id);
    match self.purchases.insert_purchase(&candidate).await? {
      PurchaseInsert::Inserted(purchase) => {
        info!(purchase_id = %purchase.id, "Purchase recorded.");
        Ok(purchase)
      }
      PurchaseInsert::Duplicate => {
        info!("Purchase already recorded; confirmation treated as a repeat.");
        self
          .purchases
          .find_purchase(order.user_id, order.course_id)
          .await?
          .ok_or_else(|| AppError::Internal("purchase reported duplicate but is not readable".to_string()))
      }
    }
  }
}
