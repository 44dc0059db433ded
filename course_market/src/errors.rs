// course_market/src/errors.rs

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::OrderStatus;

/// Seconds a caller should wait before retrying a confirmation that arrived
/// ahead of its order record.
pub const ORDER_NOT_FOUND_RETRY_AFTER_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Course {course_id} already purchased by user {user_id}")]
  AlreadyPurchased { user_id: Uuid, course_id: Uuid },

  #[error("Payment verification failed for gateway order '{gateway_order_id}'")]
  PaymentVerificationFailed { gateway_order_id: String },

  #[error("Order not found for gateway order '{0}'")]
  OrderNotFound(String),

  #[error("Order '{gateway_order_id}' is already {status} and cannot change")]
  OrderClosed {
    gateway_order_id: String,
    status: OrderStatus,
  },

  #[error("User {user_id} has not purchased course {course_id}")]
  NotEntitled { user_id: Uuid, course_id: Uuid },

  #[error("Payment Gateway Error: {0}")]
  Gateway(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Stable machine-readable code included in every error body.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "validation_failed",
      AppError::Auth(_) => "unauthenticated",
      AppError::Forbidden(_) => "forbidden",
      AppError::AlreadyPurchased { .. } => "already_purchased",
      AppError::PaymentVerificationFailed { .. } => "payment_verification_failed",
      AppError::OrderNotFound(_) => "order_not_found",
      AppError::OrderClosed { .. } => "order_closed",
      AppError::NotEntitled { .. } => "not_entitled",
      AppError::Gateway(_) => "gateway_unavailable",
      AppError::Config(_) => "configuration_error",
      AppError::Sqlx(_) | AppError::Migration(_) => "database_error",
      AppError::Internal(_) => "internal_error",
    }
  }

  /// Whether the same request may succeed if repeated later.
  pub fn is_retryable(&self) -> bool {
    matches!(
      self,
      AppError::OrderNotFound(_) | AppError::Gateway(_) | AppError::Sqlx(_)
    )
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(err) => AppError::Internal(err.to_string()),
      },
    }
  }
}

impl From<reqwest::Error> for AppError {
  fn from(err: reqwest::Error) -> Self {
    AppError::Gateway(err.to_string())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::PaymentVerificationFailed { .. } => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) | AppError::NotEntitled { .. } => StatusCode::FORBIDDEN,
      AppError::AlreadyPurchased { .. } | AppError::OrderClosed { .. } => StatusCode::CONFLICT,
      AppError::OrderNotFound(_) => StatusCode::NOT_FOUND,
      AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migration(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, code = self.code(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, code = self.code(), "Responding with error");
    }

    let mut builder = HttpResponse::build(status);
    let body = match self {
      AppError::AlreadyPurchased { course_id, .. } => json!({
        "error": "Course already purchased",
        "code": self.code(),
        "courseId": course_id,
        "redirect": "/purchases",
      }),
      AppError::PaymentVerificationFailed { .. } => json!({
        "success": false,
        "error": "Payment verification failed",
        "code": self.code(),
      }),
      AppError::OrderNotFound(gateway_order_id) => {
        builder.insert_header((header::RETRY_AFTER, ORDER_NOT_FOUND_RETRY_AFTER_SECS.to_string()));
        json!({
          "success": false,
          "error": format!("No order recorded for '{}'", gateway_order_id),
          "code": self.code(),
          "retryable": true,
        })
      }
      AppError::OrderClosed { status, .. } => json!({
        "error": format!("Order is already {}", status),
        "code": self.code(),
      }),
      AppError::Gateway(_) => json!({
        "error": "Payment provider unavailable, please retry",
        "code": self.code(),
        "retryable": true,
      }),
      // Internal details stay in the logs.
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migration(_) | AppError::Internal(_) => json!({
        "error": "An internal error occurred",
        "code": self.code(),
      }),
      other => json!({ "error": other.to_string(), "code": other.code() }),
    };
    builder.json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
