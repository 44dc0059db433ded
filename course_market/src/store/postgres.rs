// course_market/src/store/postgres.rs

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Order, OrderStatus, PaymentProof, Purchase};
use crate::store::{OrderStore, PurchaseInsert, PurchaseStore, Transition};

const ORDER_COLUMNS: &str = "id, course_id, user_id, amount, currency, gateway_order_id, gateway_payment_id, \
                             gateway_signature, status, created_at, updated_at";

/// PostgreSQL-backed store. Uniqueness is enforced by the indexes created in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;
    info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    info!("Database migrations applied.");
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "pg::insert_order", skip(self, order), fields(gateway_order_id = %order.gateway_order_id), err)]
  async fn insert_order(&self, order: &Order) -> Result<()> {
    sqlx::query(&format!(
      "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
      ORDER_COLUMNS
    ))
    .bind(order.id)
    .bind(order.course_id)
    .bind(order.user_id)
    .bind(order.amount)
    .bind(&order.currency)
    .bind(&order.gateway_order_id)
    .bind(&order.gateway_payment_id)
    .bind(&order.gateway_signature)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn find_by_gateway_order_id(&self, gateway_order_id: &str) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE gateway_order_id = $1",
      ORDER_COLUMNS
    ))
    .bind(gateway_order_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(order)
  }

  #[instrument(name = "pg::transition_order", skip(self, proof), err)]
  async fn transition_from_created(
    &self,
    gateway_order_id: &str,
    to: OrderStatus,
    proof: Option<PaymentProof<'_>>,
  ) -> Result<Transition> {
    let updated = sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET status = $2, \
         gateway_payment_id = COALESCE($3, gateway_payment_id), \
         gateway_signature = COALESCE($4, gateway_signature), \
         updated_at = now() \
       WHERE gateway_order_id = $1 AND status = 'created' \
       RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(gateway_order_id)
    .bind(to)
    .bind(proof.map(|p| p.payment_id))
    .bind(proof.map(|p| p.signature))
    .fetch_optional(&self.pool)
    .await?;

    if let Some(order) = updated {
      return Ok(Transition::Applied(order));
    }

    // Nothing matched: either the row is gone or it already left `created`.
    debug!("Conditional update matched no row, re-reading order.");
    Ok(match self.find_by_gateway_order_id(gateway_order_id).await? {
      Some(order) => Transition::Unchanged(order),
      None => Transition::Missing,
    })
  }

  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(orders)
  }
}

#[async_trait]
impl PurchaseStore for PgStore {
  #[instrument(
    name = "pg::insert_purchase",
    skip(self, purchase),
    fields(user_id = %purchase.user_id, course_id = %purchase.course_id),
    err
  )]
  async fn insert_purchase(&self, purchase: &Purchase) -> Result<PurchaseInsert> {
    let result = sqlx::query("INSERT INTO purchases (id, user_id, course_id, created_at) VALUES ($1, $2, $3, $4)")
      .bind(purchase.id)
      .bind(purchase.user_id)
      .bind(purchase.course_id)
      .bind(purchase.created_at)
      .execute(&self.pool)
      .await;

    match result {
      Ok(_) => Ok(PurchaseInsert::Inserted(purchase.clone())),
      Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
        debug!(constraint = ?db_err.constraint(), "Purchase already recorded.");
        Ok(PurchaseInsert::Duplicate)
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn find_purchase(&self, user_id: Uuid, course_id: Uuid) -> Result<Option<Purchase>> {
    let purchase = sqlx::query_as::<_, Purchase>(
      "SELECT id, user_id, course_id, created_at FROM purchases WHERE user_id = $1 AND course_id = $2",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(purchase)
  }

  async fn purchased_course_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
    let ids = sqlx::query_scalar::<_, Uuid>("SELECT course_id FROM purchases WHERE user_id = $1 ORDER BY created_at")
      .bind(user_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(ids)
  }
}
