use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Career tracks a bootcamp may offer. Stored as their display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

impl Career {
    pub fn as_str(&self) -> &'static str {
        match self {
            Career::WebDevelopment => "Web Development",
            Career::MobileDevelopment => "Mobile Development",
            Career::UiUx => "UI/UX",
            Career::DataScience => "Data Science",
            Career::Business => "Business",
            Career::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
    pub careers: Vec<String>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<i32>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub created_at: DateTime<Utc>,
    pub user: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBootcamp {
    #[validate(length(min = 1, max = 50, message = "Name can not be more than 50 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Description can not be more than 500 characters"))]
    pub description: String,
    #[validate(url(message = "Please use a valid url with HTTP or HTTPS"))]
    pub website: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be more than 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Address can not be more than 200 characters"))]
    pub address: String,
    #[validate(length(min = 1, message = "Please add at least one career"))]
    pub careers: Vec<Career>,
    pub photo: Option<String>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBootcamp {
    #[validate(length(min = 1, max = 50, message = "Name can not be more than 50 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Description can not be more than 500 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Please use a valid url with HTTP or HTTPS"))]
    pub website: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be more than 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Address can not be more than 200 characters"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "Please add at least one career"))]
    pub careers: Option<Vec<Career>>,
    pub photo: Option<String>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

pub fn career_strings(careers: &[Career]) -> Vec<String> {
    careers.iter().map(|c| c.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn careers_use_display_names() {
        let careers: Vec<Career> = serde_json::from_value(json!(["Web Development", "UI/UX"])).unwrap();
        assert_eq!(careers, vec![Career::WebDevelopment, Career::UiUx]);
        assert_eq!(career_strings(&careers), vec!["Web Development", "UI/UX"]);
        assert!(serde_json::from_value::<Career>(json!("Cooking")).is_err());
    }

    #[test]
    fn create_payload_validation() {
        let payload: CreateBootcamp = serde_json::from_value(json!({
            "name": "Devworks Bootcamp",
            "description": "Full stack web development",
            "website": "https://devworks.com",
            "email": "enroll@devworks.com",
            "address": "233 Bay State Rd Boston MA 02215",
            "careers": ["Web Development"],
            "jobAssistance": true
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert!(payload.job_assistance);
        assert!(!payload.housing);

        let too_long = CreateBootcamp { name: "x".repeat(51), ..payload.clone() };
        let errors = too_long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let no_careers = CreateBootcamp { careers: vec![], ..payload };
        assert!(no_careers.validate().is_err());
    }
}
