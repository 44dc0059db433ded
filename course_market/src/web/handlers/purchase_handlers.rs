// course_market/src/web/handlers/purchase_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_purchases", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_purchases_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let course_ids = app_state.entitlements.list_purchased_course_ids(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "purchasedCourses": course_ids })))
}

#[instrument(
  name = "handler::purchase_status",
  skip(app_state, auth_user),
  fields(user_id = %auth_user.user_id)
)]
pub async fn purchase_status_handler(
  app_state: web::Data<AppState>,
  course_id: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let course_id = course_id.into_inner();
  let purchased = app_state.entitlements.has_purchased(auth_user.user_id, course_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "courseId": course_id, "purchased": purchased })))
}
