// course_market/src/config.rs

use std::fmt;
use std::time::Duration;

use dotenvy::dotenv;

use crate::errors::{AppError, Result};

/// Key id handed to clients when the fake gateway is active and none is configured.
pub const DEV_GATEWAY_KEY_ID: &str = "rzp_test_dev";
/// Signing secret shared by the fake gateway and the verifier in development.
/// Confirmations are still verified against it.
pub const DEV_GATEWAY_KEY_SECRET: &str = "course_market_dev_signing_secret";
pub const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
  Razorpay,
  Fake,
}

/// Gateway key pair. The secret both authenticates API calls and signs confirmations.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentCredentials {
  pub key_id: String,
  pub key_secret: String,
}

impl fmt::Debug for PaymentCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PaymentCredentials")
      .field("key_id", &self.key_id)
      .field("key_secret", &"[REDACTED]")
      .finish()
  }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
  pub kind: GatewayKind,
  pub credentials: PaymentCredentials,
  pub api_base_url: String,
  pub timeout: Duration,
  pub currency: String,
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub gateway: GatewayConfig,
}

impl fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("store_backend", &self.store_backend)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("database_max_connections", &self.database_max_connections)
      .field("gateway", &self.gateway)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let require = |name: &str, why: &str| {
      get_env(name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}' ({})", name, why)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", get_env("SERVER_PORT"), 8080u16)?;

    let store_backend = match get_env("STORE_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("postgres") => StoreBackend::Postgres,
      Some("memory") => StoreBackend::Memory,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid STORE_BACKEND '{}': expected 'postgres' or 'memory'",
          other
        )))
      }
    };
    let database_url = match store_backend {
      StoreBackend::Postgres => Some(require("DATABASE_URL", "required by the postgres store")?),
      StoreBackend::Memory => get_env("DATABASE_URL"),
    };
    let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", get_env("DATABASE_MAX_CONNECTIONS"), 10u32)?;

    let kind = match get_env("PAYMENT_GATEWAY").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("fake") => GatewayKind::Fake,
      Some("razorpay") => GatewayKind::Razorpay,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid PAYMENT_GATEWAY '{}': expected 'razorpay' or 'fake'",
          other
        )))
      }
    };
    let credentials = match kind {
      GatewayKind::Razorpay => PaymentCredentials {
        key_id: require("RAZORPAY_KEY_ID", "required by the razorpay gateway")?,
        key_secret: require("RAZORPAY_KEY_SECRET", "required by the razorpay gateway")?,
      },
      GatewayKind::Fake => PaymentCredentials {
        key_id: get_env("RAZORPAY_KEY_ID").unwrap_or_else(|| DEV_GATEWAY_KEY_ID.to_string()),
        key_secret: get_env("RAZORPAY_KEY_SECRET").unwrap_or_else(|| DEV_GATEWAY_KEY_SECRET.to_string()),
      },
    };
    let api_base_url = get_env("RAZORPAY_API_BASE")
      .unwrap_or_else(|| DEFAULT_RAZORPAY_API_BASE.to_string())
      .trim_end_matches('/')
      .to_string();
    let timeout_secs = parse_var("GATEWAY_TIMEOUT_SECS", get_env("GATEWAY_TIMEOUT_SECS"), 10u64)?;
    let currency = get_env("PAYMENT_CURRENCY")
      .unwrap_or_else(|| "INR".to_string())
      .to_ascii_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(AppError::Config(format!(
        "Invalid PAYMENT_CURRENCY '{}': expected a 3-letter code",
        currency
      )));
    }

    let config = Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      database_max_connections,
      gateway: GatewayConfig {
        kind,
        credentials,
        api_base_url,
        timeout: Duration::from_secs(timeout_secs),
        currency,
      },
    };
    tracing::info!(config = ?config, "Application configuration loaded successfully.");
    Ok(config)
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_var<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(value) => value
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
  }
}
