// course_market/src/services/gateway/razorpay.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::{GatewayConfig, PaymentCredentials};
use crate::errors::{AppError, Result};
use crate::services::gateway::{PaymentGateway, RemoteOrder};

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
  amount: i64,
  currency: &'a str,
  receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrder {
  id: String,
  amount: i64,
  currency: String,
  #[serde(default)]
  status: Option<String>,
}

/// Razorpay Orders API client.
pub struct RazorpayGateway {
  client: Client,
  api_base_url: String,
  credentials: PaymentCredentials,
}

impl RazorpayGateway {
  pub fn new(config: &GatewayConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Failed to build gateway HTTP client: {}", e)))?;
    Ok(Self {
      client,
      api_base_url: config.api_base_url.clone(),
      credentials: config.credentials.clone(),
    })
  }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
  #[instrument(name = "razorpay::create_order", skip(self), err(Display))]
  async fn create_remote_order(
    &self,
    amount_minor_units: i64,
    currency: &str,
    receipt_ref: &str,
  ) -> Result<RemoteOrder> {
    let response = self
      .client
      .post(format!("{}/orders", self.api_base_url))
      .basic_auth(&self.credentials.key_id, Some(&self.credentials.key_secret))
      .json(&CreateOrderRequest {
        amount: amount_minor_units,
        currency,
        receipt: receipt_ref,
      })
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body: String = response.text().await.unwrap_or_default().chars().take(300).collect();
      warn!(%status, body = %body, "Gateway rejected order creation.");
      return Err(AppError::Gateway(format!("order creation returned {}: {}", status, body)));
    }

    let order: RazorpayOrder = response.json().await?;
    info!(gateway_order_id = %order.id, status = ?order.status, "Remote order created.");
    Ok(RemoteOrder {
      gateway_order_id: order.id,
      amount: order.amount,
      currency: order.currency,
    })
  }

  fn key_id(&self) -> &str {
    &self.credentials.key_id
  }

  fn name(&self) -> &'static str {
    "razorpay"
  }
}
