use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::utils::{fetch_record, parse_id, parse_payload};
use crate::app::AppState;
use crate::database::models::{Course, CreateCourse, Role, UpdateCourse};
use crate::database::schema::COURSES;
use crate::error::ApiError;
use crate::middleware::{authorize, ApiResponse, ApiResult, AuthUser, Listing};
use crate::query::AdvancedResults;
use crate::services::CourseService;

/// GET /api/v1/courses
pub async fn list(Extension(results): Extension<AdvancedResults>) -> Json<AdvancedResults> {
    Json(results)
}

/// GET /api/v1/bootcamps/:id/courses - every course of one bootcamp, unpaginated
pub async fn list_for_bootcamp(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
) -> Result<Listing<Course>, ApiError> {
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let courses = CourseService::new(state.db.pool().clone())
        .list_for_bootcamp(bootcamp_id)
        .await?;
    Ok(Listing::new(courses))
}

/// GET /api/v1/courses/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let course = fetch_record(state.records.as_ref(), &COURSES, id, || format!("No course with the id of {}", id)).await?;
    Ok(ApiResponse::success(course))
}

/// POST /api/v1/courses - courses are only created under a bootcamp
pub async fn create_without_bootcamp() -> ApiError {
    ApiError::bad_request("Please add bootcamp id in the request")
}

/// POST /api/v1/bootcamps/:id/courses
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(bootcamp_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Course> {
    authorize(&user, &[Role::Publisher, Role::Admin])?;
    let bootcamp_id = parse_id(&bootcamp_id)?;
    let input: CreateCourse = parse_payload(body)?;
    let course = CourseService::new(state.db.pool().clone())
        .create(bootcamp_id, &user, input)
        .await?;
    Ok(ApiResponse::created(course))
}

/// PUT /api/v1/courses/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Course> {
    let id = parse_id(&id)?;
    let input: UpdateCourse = parse_payload(body)?;
    let course = CourseService::new(state.db.pool().clone()).update(id, &user, input).await?;
    Ok(ApiResponse::success(course))
}

/// DELETE /api/v1/courses/:id
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    CourseService::new(state.db.pool().clone()).delete(id, &user).await?;
    Ok(ApiResponse::success(json!({})))
}
