use sqlx::PgPool;
use uuid::Uuid;

use super::{ensure_owner, BootcampService, ServiceError};
use crate::database::models::{Course, CreateCourse, UpdateCourse, User};

/// Course writes keep the owning bootcamp's `averageCost` current.
pub struct CourseService {
    pool: PgPool,
    bootcamps: BootcampService,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { bootcamps: BootcampService::new(pool.clone()), pool }
    }

    pub async fn list_for_bootcamp(&self, bootcamp_id: Uuid) -> Result<Vec<Course>, ServiceError> {
        let courses = sqlx::query_as::<_, Course>(
            r#"SELECT * FROM "courses" WHERE "bootcamp" = $1 ORDER BY "createdAt" ASC, "id" ASC"#,
        )
        .bind(bootcamp_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    pub async fn get(&self, id: Uuid) -> Result<Course, ServiceError> {
        sqlx::query_as::<_, Course>(r#"SELECT * FROM "courses" WHERE "id" = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No course with the id of {}", id)))
    }

    pub async fn create(&self, bootcamp_id: Uuid, user: &User, input: CreateCourse) -> Result<Course, ServiceError> {
        let bootcamp = self.bootcamps.get(bootcamp_id).await?;
        ensure_owner(bootcamp.user, user, || {
            format!(
                "User {} is not authorized to add a course to bootcamp {}",
                user.id, bootcamp_id
            )
        })?;

        let course = sqlx::query_as::<_, Course>(
            r#"INSERT INTO "courses"
                ("title", "description", "weeks", "tuition", "minimumSkill", "scholarshipAvailable", "bootcamp", "user")
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.weeks)
        .bind(input.tuition)
        .bind(input.minimum_skill.as_str())
        .bind(input.scholarship_available)
        .bind(bootcamp_id)
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        self.bootcamps.refresh_average_cost(bootcamp_id).await?;
        Ok(course)
    }

    pub async fn update(&self, id: Uuid, user: &User, input: UpdateCourse) -> Result<Course, ServiceError> {
        let current = self.get(id).await?;
        ensure_owner(current.user, user, || {
            format!("User {} is not authorized to update course {}", user.id, id)
        })?;

        let course = sqlx::query_as::<_, Course>(
            r#"UPDATE "courses" SET
                "title" = COALESCE($2, "title"),
                "description" = COALESCE($3, "description"),
                "weeks" = COALESCE($4, "weeks"),
                "tuition" = COALESCE($5, "tuition"),
                "minimumSkill" = COALESCE($6, "minimumSkill"),
                "scholarshipAvailable" = COALESCE($7, "scholarshipAvailable")
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.weeks)
        .bind(input.tuition)
        .bind(input.minimum_skill.map(|s| s.as_str()))
        .bind(input.scholarship_available)
        .fetch_one(&self.pool)
        .await?;

        if input.tuition.is_some() {
            self.bootcamps.refresh_average_cost(course.bootcamp).await?;
        }
        Ok(course)
    }

    pub async fn delete(&self, id: Uuid, user: &User) -> Result<(), ServiceError> {
        let current = self.get(id).await?;
        ensure_owner(current.user, user, || {
            format!("User {} is not authorized to delete course {}", user.id, id)
        })?;

        sqlx::query(r#"DELETE FROM "courses" WHERE "id" = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.bootcamps.refresh_average_cost(current.bootcamp).await?;
        Ok(())
    }
}
