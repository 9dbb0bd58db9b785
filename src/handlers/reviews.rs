use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::utils::{fetch_record, parse_id, parse_payload};
use crate::app::AppState;
use crate::database::models::{CreateReview, Review, Role, UpdateReview};
use crate::database::schema::REVIEWS;
use crate::error::ApiError;
use crate::middleware::{authorize, ApiResponse, ApiResult, AuthUser, Listing};
use crate::query::AdvancedResults;
use crate::services::ReviewService;

/// GET /api/v1/reviews
pub async fn list(Extension(results): Extension<AdvancedResults>) -> Json<AdvancedResults> {
    Json(results)
}

/// GET /api/v1/bootcamps/:id/reviews
pub async fn list_for_bootcamp(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
) -> Result<Listing<Review>, ApiError> {
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let reviews = ReviewService::new(state.db.pool().clone())
        .list_for_bootcamp(bootcamp_id)
        .await?;
    Ok(Listing::new(reviews))
}

/// GET /api/v1/reviews/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let review = fetch_record(state.records.as_ref(), &REVIEWS, id, || format!("No review found with the id of {}", id)).await?;
    Ok(ApiResponse::success(review))
}

/// POST /api/v1/bootcamps/:id/reviews
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(bootcamp_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Review> {
    authorize(&user, &[Role::User, Role::Publisher, Role::Admin])?;
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let input: CreateReview = parse_payload(body)?;
    let review = ReviewService::new(state.db.pool().clone())
        .create(bootcamp_id, &user, input)
        .await?;
    Ok(ApiResponse::created(review))
}

/// PUT /api/v1/reviews/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Review> {
    let id = parse_id(&id)?;
    let input: UpdateReview = parse_payload(body)?;
    let review = ReviewService::new(state.db.pool().clone()).update(id, &user, input).await?;
    Ok(ApiResponse::success(review))
}

/// DELETE /api/v1/reviews/:id
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    ReviewService::new(state.db.pool().clone()).delete(id, &user).await?;
    Ok(ApiResponse::success(json!({})))
}
