use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub bootcamp: Uuid,
    pub user: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReview {
    #[validate(length(min = 1, max = 100, message = "Please add a title"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please add some text"))]
    pub text: String,
    #[validate(range(min = 1, max = 10, message = "Please add a rating between 1 and 10"))]
    pub rating: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateReview {
    #[validate(length(min = 1, max = 100, message = "Please add a title"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Please add some text"))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Please add a rating between 1 and 10"))]
    pub rating: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_between_one_and_ten() {
        let review = CreateReview { title: "Great".into(), text: "Learned a lot".into(), rating: 11 };
        let errors = review.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rating"));

        let ok = CreateReview { rating: 10, ..review };
        assert!(ok.validate().is_ok());
    }
}
