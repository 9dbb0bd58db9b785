pub mod bootcamp_service;
pub mod course_service;
pub mod review_service;
pub mod user_service;

pub use bootcamp_service::BootcampService;
pub use course_service::CourseService;
pub use review_service::ReviewService;
pub use user_service::UserService;

use uuid::Uuid;

use crate::auth::AuthError;
use crate::database::models::User;
use crate::database::DatabaseError;

/// Errors from the write-path services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotAuthorized(String),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlx(err))
    }
}

/// Owners and admins may modify a record; everyone else is refused.
pub fn ensure_owner(owner: Uuid, user: &User, message: impl FnOnce() -> String) -> Result<(), ServiceError> {
    if owner == user.id || user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::NotAuthorized(message()))
    }
}

/// Lowercase, ASCII alphanumerics separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

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
    fn slugs_are_lowercase_and_dashed() {
        assert_eq!(slugify("Devworks Bootcamp"), "devworks-bootcamp");
        assert_eq!(slugify("  ModernTech  Bootcamp!! "), "moderntech-bootcamp");
        assert_eq!(slugify("UI/UX & Design"), "ui-ux-design");
    }

    #[test]
    fn owner_or_admin_may_modify() {
        let owner = user("publisher");
        assert!(ensure_owner(owner.id, &owner, || "no".into()).is_ok());
        assert!(ensure_owner(owner.id, &user("admin"), || "no".into()).is_ok());
        assert!(matches!(
            ensure_owner(owner.id, &user("publisher"), || "no".into()),
            Err(ServiceError::NotAuthorized(_))
        ));
    }
}
