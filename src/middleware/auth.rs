use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{extract_token, validate_jwt};
use crate::database::models::{Role, User};
use crate::error::ApiError;
use crate::services::UserService;

/// The account behind a verified token.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Not authorized to access this route"))
    }
}

/// Resolves the bearer token or `token` cookie to a user and stores it in the
/// request extensions. Missing, invalid or orphaned tokens are rejected with 401.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = request.headers();
    let authorization = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());

    let token = extract_token(authorization, cookie)
        .ok_or_else(|| ApiError::unauthorized("Not authorized to access this route"))?;

    let claims = validate_jwt(&token, &state.config.security).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized("Not authorized to access this route")
    })?;

    let user = UserService::new(state.db.pool().clone())
        .find(claims.id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token for unknown user {}", claims.id);
            ApiError::unauthorized("Not authorized to access this route")
        })?;

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}

/// Runs after [`jwt_auth_middleware`]; only admins pass.
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Not authorized to access this route"))?;
    authorize(&user.0, &[Role::Admin])?;
    Ok(next.run(request).await)
}

pub fn authorize(user: &User, roles: &[Role]) -> Result<(), ApiError> {
    if roles.contains(&user.role()) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            role: role.into(),
            phone: None,
            password: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn role_outside_the_list_is_forbidden() {
        let err = authorize(&user("user"), &[Role::Publisher, Role::Admin]).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "User role user is not authorized to access this route");
        assert!(authorize(&user("publisher"), &[Role::Publisher, Role::Admin]).is_ok());
    }
}
