//! Admin-only user management. The router applies `jwt_auth_middleware` and
//! `require_admin_middleware` to every route here.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::utils::{fetch_record, parse_id, parse_payload};
use crate::app::AppState;
use crate::database::models::{CreateUser, UpdateUser, User};
use crate::database::schema::USERS;
use crate::middleware::{ApiResponse, ApiResult};
use crate::query::AdvancedResults;
use crate::services::UserService;

/// GET /api/v1/users
pub async fn list(Extension(results): Extension<AdvancedResults>) -> Json<AdvancedResults> {
    Json(results)
}

/// GET /api/v1/users/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let user = fetch_record(state.records.as_ref(), &USERS, id, || format!("User not found with id of {}", id)).await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/v1/users
pub async fn create(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<User> {
    let input: CreateUser = parse_payload(body)?;
    let user = UserService::new(state.db.pool().clone()).create(input).await?;
    Ok(ApiResponse::created(user))
}

/// PUT /api/v1/users/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<User> {
    let id = parse_id(&id)?;
    let input: UpdateUser = parse_payload(body)?;
    let user = UserService::new(state.db.pool().clone()).update(id, input).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/v1/users/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    UserService::new(state.db.pool().clone()).delete(id).await?;
    Ok(ApiResponse::success(json!({})))
}
