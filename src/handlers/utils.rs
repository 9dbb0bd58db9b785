use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::database::schema::Resource;
use crate::database::source::find_by_id;
use crate::database::RecordSource;
use crate::error::ApiError;
use crate::filter::Filter;

/// Path ids must be UUIDs; anything else cannot name a record.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invalid_id(raw))
}

/// Deserialize and validate a JSON request body.
pub fn parse_payload<T>(body: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let Json(value) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let payload: T = serde_json::from_value(value).map_err(|e| ApiError::bad_request(e.to_string()))?;
    payload.validate()?;
    Ok(payload)
}

/// Single record through the record source, with the resource's populate rule applied.
pub async fn fetch_record(
    records: &dyn RecordSource,
    resource: &'static Resource,
    id: Uuid,
    not_found: impl FnOnce() -> String,
) -> Result<Value, ApiError> {
    find_by_id(records, Filter::new(resource), id)
        .await?
        .ok_or_else(|| ApiError::not_found(not_found()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::CreateReview;
    use serde_json::json;

    #[test]
    fn malformed_ids_are_bad_requests() {
        let err = parse_id("5d725a1b7b292f5f8ceff788").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Resource not found with id of 5d725a1b7b292f5f8ceff788");
        assert!(parse_id("a9f0c1d2-7c1e-4e8a-9b4f-0d2c3e4f5a6b").is_ok());
    }

    #[test]
    fn payloads_are_validated() {
        let ok: CreateReview =
            parse_payload(Ok(Json(json!({ "title": "Nice", "text": "Good", "rating": 8 })))).unwrap();
        assert_eq!(ok.rating, 8);

        let err = parse_payload::<CreateReview>(Ok(Json(json!({ "title": "Nice", "text": "Good", "rating": 0 }))))
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err = parse_payload::<CreateReview>(Ok(Json(json!({ "title": "Nice" })))).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
