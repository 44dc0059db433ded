// tests/config_env_tests.rs
mod common;

use std::sync::Arc;

use course_market::config::{AppConfig, GatewayKind, StoreBackend};
use course_market::AppState;
use serial_test::serial;
use uuid::Uuid;

const VARS: &[&str] = &[
  "SERVER_HOST",
  "SERVER_PORT",
  "STORE_BACKEND",
  "DATABASE_URL",
  "PAYMENT_GATEWAY",
  "RAZORPAY_KEY_ID",
  "RAZORPAY_KEY_SECRET",
  "PAYMENT_CURRENCY",
];

fn with_env<T>(pairs: &[(&str, &str)], body: impl FnOnce() -> T) -> T {
  for name in VARS {
    std::env::remove_var(name);
  }
  for (name, value) in pairs {
    std::env::set_var(name, value);
  }
  let out = body();
  for name in VARS {
    std::env::remove_var(name);
  }
  out
}

#[test]
#[serial]
fn reads_settings_from_process_environment() {
  common::setup_tracing();
  let config = with_env(
    &[
      ("SERVER_HOST", "0.0.0.0"),
      ("SERVER_PORT", "9191"),
      ("STORE_BACKEND", "memory"),
      ("PAYMENT_CURRENCY", "usd"),
    ],
    AppConfig::from_env,
  )
  .unwrap();

  assert_eq!(config.bind_address(), "0.0.0.0:9191");
  assert_eq!(config.store_backend, StoreBackend::Memory);
  assert_eq!(config.gateway.kind, GatewayKind::Fake);
  assert_eq!(config.gateway.currency, "USD");
}

#[test]
#[serial]
fn missing_razorpay_secret_fails_startup() {
  common::setup_tracing();
  let result = with_env(
    &[
      ("STORE_BACKEND", "memory"),
      ("PAYMENT_GATEWAY", "razorpay"),
      ("RAZORPAY_KEY_ID", "rzp_live_abc"),
    ],
    AppConfig::from_env,
  );

  assert!(result.is_err());
}

#[tokio::test]
#[serial]
async fn memory_state_from_environment_serves_a_purchase() {
  common::setup_tracing();
  let config = with_env(&[("STORE_BACKEND", "memory")], AppConfig::from_env).unwrap();
  let state = AppState::from_config(Arc::new(config)).await.unwrap();

  let (user, course) = (Uuid::new_v4(), Uuid::new_v4());
  let order = state
    .ledger
    .create_order(user, course, common::COURSE_PRICE, "INR")
    .await
    .unwrap();

  assert_eq!(order.gateway_order_id, "go_1");
  assert_eq!(state.ledger.gateway_key_id(), course_market::config::DEV_GATEWAY_KEY_ID);
  assert!(!state.entitlements.has_purchased(user, course).await.unwrap());
}
