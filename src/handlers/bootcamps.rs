use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::utils::{fetch_record, parse_id, parse_payload};
use crate::app::AppState;
use crate::database::models::{Bootcamp, CreateBootcamp, Role, UpdateBootcamp};
use crate::database::schema::BOOTCAMPS;
use crate::middleware::{authorize, ApiResponse, ApiResult, AuthUser};
use crate::query::AdvancedResults;
use crate::services::BootcampService;

/// GET /api/v1/bootcamps
pub async fn list(Extension(results): Extension<AdvancedResults>) -> Json<AdvancedResults> {
    Json(results)
}

/// GET /api/v1/bootcamps/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let bootcamp = fetch_record(state.records.as_ref(), &BOOTCAMPS, id, || {
        format!("Bootcamp not found with id of {}", id)
    })
    .await?;
    Ok(ApiResponse::success(bootcamp))
}

/// POST /api/v1/bootcamps
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Bootcamp> {
    authorize(&user, &[Role::Publisher, Role::Admin])?;
    let input: CreateBootcamp = parse_payload(body)?;
    let bootcamp = BootcampService::new(state.db.pool().clone()).create(&user, input).await?;
    Ok(ApiResponse::created(bootcamp))
}

/// PUT /api/v1/bootcamps/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Bootcamp> {
    let id = parse_id(&id)?;
    let input: UpdateBootcamp = parse_payload(body)?;
    let bootcamp = BootcampService::new(state.db.pool().clone()).update(id, &user, input).await?;
    Ok(ApiResponse::success(bootcamp))
}

/// DELETE /api/v1/bootcamps/:id - also removes its courses and reviews
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    BootcampService::new(state.db.pool().clone()).delete(id, &user).await?;
    Ok(ApiResponse::success(json!({})))
}
