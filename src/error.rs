//! HTTP error type and its JSON body.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::services::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError { message: message.into(), field_errors }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Path ids that are not UUIDs never address a record.
    pub fn invalid_id(id: &str) -> Self {
        ApiError::BadRequest(format!("Resource not found with id of {}", id))
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                (field.to_string(), message)
            })
            .collect();
        ApiError::validation_error("Validation failed", Some(field_errors))
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Filter(filter_err) => filter_err.into(),
            DatabaseError::Sqlx(sqlx_err) => {
                let code = match &sqlx_err {
                    sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
                    _ => None,
                };
                match code.as_deref() {
                    // invalid_text_representation, invalid_datetime_format, datetime_field_overflow
                    Some("22P02") | Some("22007") | Some("22008") => {
                        ApiError::bad_request("Invalid value in query or request body")
                    }
                    // numeric_value_out_of_range
                    Some("22003") => ApiError::bad_request("Numeric value out of range"),
                    Some("23505") => ApiError::bad_request("Duplicate field value entered"),
                    Some("23503") => ApiError::bad_request("Referenced resource does not exist"),
                    Some("23514") => ApiError::bad_request("Value not allowed"),
                    _ => {
                        // Log the real error but return generic message
                        tracing::error!("SQLx error: {}", sqlx_err);
                        ApiError::internal_server_error("Server Error")
                    }
                }
            }
            DatabaseError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::ConfigMissing(key) => {
                tracing::error!("Database misconfigured: missing {}", key);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: invalid URL");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) => ApiError::unauthorized("Not authorized to access this route"),
            other => {
                tracing::error!("Auth error: {}", other);
                ApiError::internal_server_error("Server Error")
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::NotAuthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::Invalid(msg) => ApiError::bad_request(msg),
            ServiceError::Auth(e) => e.into(),
            ServiceError::Database(e) => e.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_carries_success_flag() {
        let body = ApiError::not_found("No review with the id of 1").to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body.get("field_errors").is_none());
    }

    #[test]
    fn filter_errors_are_bad_requests() {
        let err: ApiError = FilterError::InvalidColumn { resource: "bootcamp", field: "nope".into() }.into();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::NotFound("x".into()), 404),
            (ServiceError::NotAuthorized("x".into()), 401),
            (ServiceError::Invalid("x".into()), 400),
            (ServiceError::Database(DatabaseError::InvalidDatabaseUrl), 503),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn unknown_database_failures_are_generic() {
        let err = ApiError::from(DatabaseError::Sqlx(sqlx::Error::RowNotFound));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Server Error");
    }

    #[test]
    fn invalid_token_is_unauthorized() {
        let err = ApiError::from(AuthError::InvalidToken("bad".into()));
        assert_eq!(err.status_code(), 401);
    }
}
