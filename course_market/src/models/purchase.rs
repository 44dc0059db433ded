// course_market/src/models/purchase.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A permanent entitlement: the user owns the course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
  pub id: Uuid,
  pub user_id: Uuid,
  pub course_id: Uuid,
  pub created_at: DateTime<Utc>,
}

impl Purchase {
  pub fn new(user_id: Uuid, course_id: Uuid) -> Self {
    Self {
      id: Uuid::new_v4(),
      user_id,
      course_id,
      created_at: Utc::now(),
    }
  }
}
