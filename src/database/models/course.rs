use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

impl MinimumSkill {
    pub fn as_str(&self) -> &'static str {
        match self {
            MinimumSkill::Beginner => "beginner",
            MinimumSkill::Intermediate => "intermediate",
            MinimumSkill::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: i32,
    pub minimum_skill: String,
    pub scholarship_available: bool,
    pub created_at: DateTime<Utc>,
    pub bootcamp: Uuid,
    pub user: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    #[validate(length(min = 1, message = "Please add a title"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: String,
    #[validate(length(min = 1, message = "Please add number of weeks"))]
    pub weeks: String,
    #[validate(range(min = 0, message = "Please add course cost"))]
    pub tuition: i32,
    pub minimum_skill: MinimumSkill,
    #[serde(default)]
    pub scholarship_available: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourse {
    #[validate(length(min = 1, message = "Please add a title"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Please add number of weeks"))]
    pub weeks: Option<String>,
    #[validate(range(min = 0, message = "Please add course cost"))]
    pub tuition: Option<i32>,
    pub minimum_skill: Option<MinimumSkill>,
    pub scholarship_available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimum_skill_is_lowercase() {
        let payload: CreateCourse = serde_json::from_value(json!({
            "title": "Front End Web Development",
            "description": "HTML, CSS and JavaScript",
            "weeks": "8",
            "tuition": 8000,
            "minimumSkill": "beginner"
        }))
        .unwrap();
        assert_eq!(payload.minimum_skill, MinimumSkill::Beginner);
        assert!(!payload.scholarship_available);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn negative_tuition_is_rejected() {
        let update = UpdateCourse { tuition: Some(-1), ..Default::default() };
        assert!(update.validate().is_err());
    }
}
