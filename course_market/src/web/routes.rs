// course_market/src/web/routes.rs

use actix_web::{error, web, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{order_handlers, purchase_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed bodies and path segments answer in the same error shape as everything else.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default()
    .limit(16 * 1024)
    .error_handler(|err, _req| error::Error::from(AppError::Validation(err.to_string())))
}

fn path_config() -> web::PathConfig {
  web::PathConfig::default().error_handler(|err, _req| error::Error::from(AppError::Validation(err.to_string())))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .app_data(json_config())
      .app_data(path_config())
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/order")
          .route("/create", web::post().to(order_handlers::create_order_handler))
          .route("/verify", web::post().to(order_handlers::verify_payment_handler))
          .route("/failed", web::post().to(order_handlers::order_failed_handler))
          .route("/mine", web::get().to(order_handlers::my_orders_handler)),
      )
      .service(
        web::scope("/purchases")
          .route("", web::get().to(purchase_handlers::list_purchases_handler))
          .route("/{course_id}", web::get().to(purchase_handlers::purchase_status_handler)),
      ),
  );
}
