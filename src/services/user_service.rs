use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::{hash_password, verify_password};
use crate::database::models::{CreateUser, Role, UpdateDetails, UpdatePassword, UpdateUser, User};

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "users" WHERE "id" = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ServiceError> {
        self.find(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User not found with id of {}", id)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "users" WHERE lower("email") = lower($1)"#)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Self-service signup; requesting `admin` is refused.
    pub async fn register(&self, input: CreateUser) -> Result<User, ServiceError> {
        if input.role == Some(Role::Admin) {
            return Err(ServiceError::Invalid("Cannot register as admin".to_string()));
        }
        self.create(input).await
    }

    pub async fn create(&self, input: CreateUser) -> Result<User, ServiceError> {
        let password = hash_password(&input.password)?;
        let role = input.role.unwrap_or(Role::User);

        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO "users" ("name", "email", "role", "phone", "password")
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(input.name.trim())
        .bind(input.email.trim().to_lowercase())
        .bind(role.as_str())
        .bind(&input.phone)
        .bind(password)
        .fetch_one(&self.pool)
        .await?;

        info!("Created user {} with role {}", user.id, user.role);
        Ok(user)
    }

    /// Resolves credentials to a user; both failure modes read the same.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let invalid = || ServiceError::NotAuthorized("Invalid credentials".to_string());
        let user = self.find_by_email(email).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password)? {
            return Err(invalid());
        }
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, input: UpdateUser) -> Result<User, ServiceError> {
        let user = sqlx::query_as::<_, User>(
            r#"UPDATE "users" SET
                "name" = COALESCE($2, "name"),
                "email" = COALESCE($3, "email"),
                "role" = COALESCE($4, "role"),
                "phone" = COALESCE($5, "phone")
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.email.map(|e| e.trim().to_lowercase()))
        .bind(input.role.map(|r| r.as_str()))
        .bind(&input.phone)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| ServiceError::NotFound(format!("User not found with id of {}", id)))
    }

    pub async fn update_details(&self, id: Uuid, input: UpdateDetails) -> Result<User, ServiceError> {
        self.update(
            id,
            UpdateUser { name: input.name, email: input.email, ..Default::default() },
        )
        .await
    }

    pub async fn update_password(&self, id: Uuid, input: UpdatePassword) -> Result<User, ServiceError> {
        let user = self.get(id).await?;
        if !verify_password(&input.current_password, &user.password)? {
            return Err(ServiceError::NotAuthorized("Password is incorrect".to_string()));
        }

        let password = hash_password(&input.new_password)?;
        let user = sqlx::query_as::<_, User>(r#"UPDATE "users" SET "password" = $2 WHERE "id" = $1 RETURNING *"#)
            .bind(id)
            .bind(password)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    /// Refuses while the user still owns content.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get(id).await?;

        let owned: i64 = sqlx::query_scalar(
            r#"SELECT (SELECT COUNT(*) FROM "bootcamps" WHERE "user" = $1)
                    + (SELECT COUNT(*) FROM "courses" WHERE "user" = $1)
                    + (SELECT COUNT(*) FROM "reviews" WHERE "user" = $1)"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if owned > 0 {
            return Err(ServiceError::Invalid(format!(
                "User {} still owns {} bootcamps, courses or reviews",
                id, owned
            )));
        }

        sqlx::query(r#"DELETE FROM "users" WHERE "id" = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
