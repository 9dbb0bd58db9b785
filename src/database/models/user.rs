use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Publisher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "publisher" => Some(Role::Publisher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Unknown stored roles are treated as the least privileged role.
    pub fn role(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::User)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }
}

/// Self-service registration. `admin` cannot be requested here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, message = "Please add name for user"))]
    pub name: String,
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<Role>,
    #[validate(length(max = 20, message = "Phone number can not be more than 20 characters"))]
    pub phone: Option<String>,
}

/// Admin-side user creation; any role allowed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Please add name for user"))]
    pub name: String,
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<Role>,
    #[validate(length(max = 20, message = "Phone number can not be more than 20 characters"))]
    pub phone: Option<String>,
}

impl From<RegisterUser> for CreateUser {
    fn from(r: RegisterUser) -> Self {
        CreateUser {
            name: r.name,
            email: r.email,
            password: r.password,
            role: r.role,
            phone: r.phone,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Please add name for user"))]
    pub name: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    #[validate(length(max = 20, message = "Phone number can not be more than 20 characters"))]
    pub phone: Option<String>,
}

/// Fields a user may change on their own account.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDetails {
    #[validate(length(min = 1, message = "Please add name for user"))]
    pub name: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassword {
    #[validate(length(min = 1, message = "Please provide your current password"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide an email and password"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please provide an email and password"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "John Doe".into(),
            email: "john@gmail.com".into(),
            role: role.into(),
            phone: None,
            password: "$2b$12$abcdefghijklmnopqrstuu5nTtbKyOnb6PrN0S3qu2N2XUNXcjD2W".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn password_is_never_serialized() {
        let value = serde_json::to_value(user("publisher")).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["role"], "publisher");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn unknown_role_falls_back_to_user() {
        assert_eq!(user("root").role(), Role::User);
        assert!(user("admin").is_admin());
    }

    #[test]
    fn register_payload_checks_email_and_password() {
        let payload: RegisterUser = serde_json::from_value(json!({
            "name": "Jane",
            "email": "not-an-email",
            "password": "123"
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn update_password_uses_camel_case() {
        let payload: UpdatePassword = serde_json::from_value(json!({
            "currentPassword": "123456",
            "newPassword": "abcdef"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
    }
}
