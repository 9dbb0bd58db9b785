use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{ensure_owner, slugify, ServiceError};
use crate::database::models::bootcamp::career_strings;
use crate::database::models::{Bootcamp, CreateBootcamp, Role, UpdateBootcamp, User};

pub struct BootcampService {
    pool: PgPool,
}

impl BootcampService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Bootcamp>, ServiceError> {
        let bootcamp = sqlx::query_as::<_, Bootcamp>(r#"SELECT * FROM "bootcamps" WHERE "id" = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bootcamp)
    }

    pub async fn get(&self, id: Uuid) -> Result<Bootcamp, ServiceError> {
        self.find(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Bootcamp not found with id of {}", id)))
    }

    /// Publishers may own a single bootcamp; admins any number. The owner's
    /// row is locked for the check so concurrent creates serialize.
    pub async fn create(&self, user: &User, input: CreateBootcamp) -> Result<Bootcamp, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if user.role() != Role::Admin {
            sqlx::query(r#"SELECT 1 FROM "users" WHERE "id" = $1 FOR UPDATE"#)
                .bind(user.id)
                .execute(&mut *tx)
                .await?;
            let existing: Option<Uuid> =
                sqlx::query_scalar(r#"SELECT "id" FROM "bootcamps" WHERE "user" = $1 LIMIT 1"#)
                    .bind(user.id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if existing.is_some() {
                return Err(ServiceError::Invalid(format!(
                    "The user with ID {} has already published a bootcamp",
                    user.id
                )));
            }
        }

        let bootcamp = sqlx::query_as::<_, Bootcamp>(
            r#"INSERT INTO "bootcamps"
                ("name", "slug", "description", "website", "email", "phone", "address", "careers",
                 "photo", "housing", "jobAssistance", "jobGuarantee", "acceptGi", "user")
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 'no-photo.jpg'), $10, $11, $12, $13, $14)
               RETURNING *"#,
        )
        .bind(input.name.trim())
        .bind(slugify(&input.name))
        .bind(&input.description)
        .bind(&input.website)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(career_strings(&input.careers))
        .bind(&input.photo)
        .bind(input.housing)
        .bind(input.job_assistance)
        .bind(input.job_guarantee)
        .bind(input.accept_gi)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Created bootcamp {} ({})", bootcamp.name, bootcamp.id);
        Ok(bootcamp)
    }

    pub async fn update(&self, id: Uuid, user: &User, input: UpdateBootcamp) -> Result<Bootcamp, ServiceError> {
        let current = self.get(id).await?;
        ensure_owner(current.user, user, || {
            format!("User {} is not authorized to update this bootcamp", user.id)
        })?;

        let name = input.name.as_deref().map(str::trim);
        let slug = name.map(slugify);
        let careers = input.careers.as_deref().map(career_strings);

        let bootcamp = sqlx::query_as::<_, Bootcamp>(
            r#"UPDATE "bootcamps" SET
                "name" = COALESCE($2, "name"),
                "slug" = COALESCE($3, "slug"),
                "description" = COALESCE($4, "description"),
                "website" = COALESCE($5, "website"),
                "email" = COALESCE($6, "email"),
                "phone" = COALESCE($7, "phone"),
                "address" = COALESCE($8, "address"),
                "careers" = COALESCE($9, "careers"),
                "photo" = COALESCE($10, "photo"),
                "housing" = COALESCE($11, "housing"),
                "jobAssistance" = COALESCE($12, "jobAssistance"),
                "jobGuarantee" = COALESCE($13, "jobGuarantee"),
                "acceptGi" = COALESCE($14, "acceptGi")
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(&input.description)
        .bind(&input.website)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(careers)
        .bind(&input.photo)
        .bind(input.housing)
        .bind(input.job_assistance)
        .bind(input.job_guarantee)
        .bind(input.accept_gi)
        .fetch_one(&self.pool)
        .await?;

        Ok(bootcamp)
    }

    /// Removes the bootcamp with its courses and reviews in one transaction.
    pub async fn delete(&self, id: Uuid, user: &User) -> Result<(), ServiceError> {
        let current = self.get(id).await?;
        ensure_owner(current.user, user, || {
            format!("User {} is not authorized to delete this bootcamp", user.id)
        })?;

        let mut tx = self.pool.begin().await?;
        let courses = sqlx::query(r#"DELETE FROM "courses" WHERE "bootcamp" = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let reviews = sqlx::query(r#"DELETE FROM "reviews" WHERE "bootcamp" = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query(r#"DELETE FROM "bootcamps" WHERE "id" = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Deleted bootcamp {} with {} courses and {} reviews", id, courses, reviews);
        Ok(())
    }

    /// Mean review rating, or NULL when no reviews remain.
    pub async fn refresh_average_rating(&self, id: Uuid) -> Result<(), ServiceError> {
        sqlx::query(
            r#"UPDATE "bootcamps"
               SET "averageRating" = (SELECT AVG("rating")::double precision FROM "reviews" WHERE "bootcamp" = $1)
               WHERE "id" = $1"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mean course tuition rounded to a whole amount, or NULL without courses.
    pub async fn refresh_average_cost(&self, id: Uuid) -> Result<(), ServiceError> {
        sqlx::query(
            r#"UPDATE "bootcamps"
               SET "averageCost" = (SELECT ROUND(AVG("tuition"))::integer FROM "courses" WHERE "bootcamp" = $1)
               WHERE "id" = $1"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
