// course_market/src/services/entitlements.rs

//! Read-only answers to "does this user own this course". Backed directly by the
//! purchase store with no cache, so a grant is visible as soon as it commits.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::store::PurchaseStore;

#[derive(Clone)]
pub struct EntitlementService {
  purchases: Arc<dyn PurchaseStore>,
}

impl EntitlementService {
  pub fn new(purchases: Arc<dyn PurchaseStore>) -> Self {
    Self { purchases }
  }

  #[instrument(name = "entitlements::has_purchased", skip(self), err(Display))]
  pub async fn has_purchased(&self, user_id: Uuid, course_id: Uuid) -> Result<bool> {
    let owned = self.purchases.find_purchase(user_id, course_id).await?.is_some();
    debug!(owned, "Entitlement checked.");
    Ok(owned)
  }

  pub async fn list_purchased_course_ids(&self, user_id: Uuid) -> Result<BTreeSet<Uuid>> {
    Ok(self.purchases.purchased_course_ids(user_id).await?.into_iter().collect())
  }

  /// Guard for review and course-content access.
  pub async fn ensure_purchased(&self, user_id: Uuid, course_id: Uuid) -> Result<()> {
    if self.has_purchased(user_id, course_id).await? {
      Ok(())
    } else {
      Err(AppError::NotEntitled { user_id, course_id })
    }
  }
}
