// course_market/src/state.rs
use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::errors::{AppError, Result};
use crate::services::{build_gateway, EntitlementService, OrderLedger, PaymentGateway, PurchaseRecorder};
use crate::store::{MemoryStore, OrderStore, PgStore, PurchaseStore};

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub ledger: OrderLedger,
  pub recorder: PurchaseRecorder,
  pub entitlements: EntitlementService,
}

impl AppState {
  /// Wires the services over explicit collaborators.
  pub fn assemble(
    config: Arc<AppConfig>,
    orders: Arc<dyn OrderStore>,
    purchases: Arc<dyn PurchaseStore>,
    gateway: Arc<dyn PaymentGateway>,
  ) -> Self {
    let entitlements = EntitlementService::new(purchases.clone());
    let ledger = OrderLedger::new(orders, entitlements.clone(), gateway);
    let recorder = PurchaseRecorder::new(
      ledger.clone(),
      entitlements.clone(),
      purchases,
      config.gateway.credentials.clone(),
    );
    Self {
      config,
      ledger,
      recorder,
      entitlements,
    }
  }

  /// Builds the store and gateway selected by `config`, running migrations for PostgreSQL.
  pub async fn from_config(config: Arc<AppConfig>) -> Result<Self> {
    let gateway = build_gateway(&config.gateway)?;
    match config.store_backend {
      StoreBackend::Postgres => {
        let url = config
          .database_url
          .as_deref()
          .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres store".to_string()))?;
        let store = Arc::new(PgStore::connect(url, config.database_max_connections).await?);
        store.migrate().await?;
        Ok(Self::assemble(config, store.clone(), store, gateway))
      }
      StoreBackend::Memory => {
        tracing::warn!("Using the in-memory store; orders and purchases are lost on restart.");
        let store = Arc::new(MemoryStore::new());
        Ok(Self::assemble(config, store.clone(), store, gateway))
      }
    }
  }
}
