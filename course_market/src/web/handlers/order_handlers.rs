// course_market/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::PaymentConfirmation;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
  pub course_id: Uuid,
  /// Major units.
  pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct OrderFailedRequest {
  #[serde(alias = "razorpay_order_id")]
  pub gateway_order_id: String,
}

#[instrument(
  name = "handler::create_order",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user_id, course_id = %payload.course_id)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateOrderRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .ledger
    .create_order(
      auth_user.user_id,
      payload.course_id,
      payload.amount,
      &app_state.config.gateway.currency,
    )
    .await?;

  Ok(HttpResponse::Ok().json(json!({
    "orderId": order.gateway_order_id,
    "amount": order.amount_minor_units(),
    "currency": order.currency,
    "key": app_state.ledger.gateway_key_id(),
  })))
}

/// Confirmation callback. Unauthenticated: the signature is the trust boundary.
#[instrument(
  name = "handler::verify_payment",
  skip(app_state, payload),
  fields(gateway_order_id = %payload.gateway_order_id)
)]
pub async fn verify_payment_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<PaymentConfirmation>,
) -> Result<HttpResponse, AppError> {
  let purchase = app_state.recorder.confirm_payment(&payload).await?;
  info!(purchase_id = %purchase.id, "Payment verified.");
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Payment verified",
    "courseId": purchase.course_id,
  })))
}

#[instrument(
  name = "handler::order_failed",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user_id, gateway_order_id = %payload.gateway_order_id)
)]
pub async fn order_failed_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<OrderFailedRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .ledger
    .find_by_gateway_order_id(&payload.gateway_order_id)
    .await?
    .ok_or_else(|| AppError::OrderNotFound(payload.gateway_order_id.clone()))?;
  if order.user_id != auth_user.user_id {
    return Err(AppError::Forbidden("Order belongs to another user".to_string()));
  }

  let order = app_state.ledger.mark_failed(&payload.gateway_order_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "orderId": order.gateway_order_id, "status": order.status })))
}

#[instrument(name = "handler::my_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn my_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.ledger.orders_for_user(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}
