use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::utils::parse_payload;
use crate::app::AppState;
use crate::auth::{generate_jwt, token_cookie, TOKEN_COOKIE};
use crate::database::models::{LoginRequest, RegisterUser, UpdateDetails, UpdatePassword, User};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UserService;

/// `{ success, token }` plus the token cookie.
fn token_response(state: &AppState, user: &User) -> Result<Response, ApiError> {
    let token = generate_jwt(user.id, &state.config.security)?;
    let cookie = token_cookie(&token, &state.config.security);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true, "token": token })),
    )
        .into_response())
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input: RegisterUser = parse_payload(body)?;
    let user = UserService::new(state.db.pool().clone()).register(input.into()).await?;
    token_response(&state, &user)
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input: LoginRequest = parse_payload(body)?;
    let user = UserService::new(state.db.pool().clone())
        .authenticate(&input.email, &input.password)
        .await?;
    tracing::info!("User {} logged in", user.id);
    token_response(&state, &user)
}

/// GET /api/v1/auth/logout - overwrites the cookie with a short-lived placeholder
pub async fn logout() -> impl IntoResponse {
    let cookie = format!("{}=none; Max-Age=10; Path=/; HttpOnly; SameSite=Lax", TOKEN_COOKIE);
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true, "data": {} })),
    )
}

/// GET /api/v1/auth/me
pub async fn me(AuthUser(user): AuthUser) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/auth/updatedetails - name and email only
pub async fn update_details(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<User> {
    let input: UpdateDetails = parse_payload(body)?;
    let user = UserService::new(state.db.pool().clone())
        .update_details(user.id, input)
        .await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/auth/updatepassword - issues a fresh token
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input: UpdatePassword = parse_payload(body)?;
    let user = UserService::new(state.db.pool().clone())
        .update_password(user.id, input)
        .await?;
    token_response(&state, &user)
}
