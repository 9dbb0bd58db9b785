use sqlx::PgPool;
use uuid::Uuid;

use super::{ensure_owner, BootcampService, ServiceError};
use crate::database::models::{CreateReview, Review, UpdateReview, User};

/// Review writes keep the owning bootcamp's `averageRating` current.
pub struct ReviewService {
    pool: PgPool,
    bootcamps: BootcampService,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { bootcamps: BootcampService::new(pool.clone()), pool }
    }

    pub async fn list_for_bootcamp(&self, bootcamp_id: Uuid) -> Result<Vec<Review>, ServiceError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"SELECT * FROM "reviews" WHERE "bootcamp" = $1 ORDER BY "createdAt" ASC, "id" ASC"#,
        )
        .bind(bootcamp_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    pub async fn get(&self, id: Uuid) -> Result<Review, ServiceError> {
        sqlx::query_as::<_, Review>(r#"SELECT * FROM "reviews" WHERE "id" = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Review not found with id of {}", id)))
    }

    pub async fn create(&self, bootcamp_id: Uuid, user: &User, input: CreateReview) -> Result<Review, ServiceError> {
        self.bootcamps.get(bootcamp_id).await?;

        let review = sqlx::query_as::<_, Review>(
            r#"INSERT INTO "reviews" ("title", "text", "rating", "bootcamp", "user")
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.rating)
        .bind(bootcamp_id)
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        self.bootcamps.refresh_average_rating(bootcamp_id).await?;
        Ok(review)
    }

    pub async fn update(&self, id: Uuid, user: &User, input: UpdateReview) -> Result<Review, ServiceError> {
        let current = self.get(id).await?;
        ensure_owner(current.user, user, || "This user is not authorized to edit this review".to_string())?;

        let review = sqlx::query_as::<_, Review>(
            r#"UPDATE "reviews" SET
                "title" = COALESCE($2, "title"),
                "text" = COALESCE($3, "text"),
                "rating" = COALESCE($4, "rating")
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.rating)
        .fetch_one(&self.pool)
        .await?;

        if input.rating.is_some() {
            self.bootcamps.refresh_average_rating(review.bootcamp).await?;
        }
        Ok(review)
    }

    pub async fn delete(&self, id: Uuid, user: &User) -> Result<(), ServiceError> {
        let current = self.get(id).await?;
        ensure_owner(current.user, user, || "This user is not authorized to delete this review".to_string())?;

        sqlx::query(r#"DELETE FROM "reviews" WHERE "id" = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.bootcamps.refresh_average_rating(current.bootcamp).await?;
        Ok(())
    }
}
