use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::bootcamp::career_strings;
use crate::database::models::{Career, MinimumSkill, Role};
use crate::database::Database;

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedBootcamp {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCourse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: i32,
    pub minimum_skill: MinimumSkill,
    #[serde(default)]
    pub scholarship_available: bool,
    pub bootcamp: Uuid,
    pub user: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SeedReview {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub bootcamp: Uuid,
    pub user: Uuid,
}

#[derive(Debug)]
pub struct SeedData {
    pub users: Vec<SeedUser>,
    pub bootcamps: Vec<SeedBootcamp>,
    pub courses: Vec<SeedCourse>,
    pub reviews: Vec<SeedReview>,
}

impl SeedData {
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            users: read_json(&dir.join("users.json"))?,
            bootcamps: read_json(&dir.join("bootcamps.json"))?,
            courses: read_json(&dir.join("courses.json"))?,
            reviews: read_json(&dir.join("reviews.json"))?,
        })
    }

    /// Every bootcamp, course and review must point at a record in the set.
    pub fn check_references(&self) -> anyhow::Result<()> {
        let user_ids: Vec<Uuid> = self.users.iter().map(|u| u.id).collect();
        let bootcamp_ids: Vec<Uuid> = self.bootcamps.iter().map(|b| b.id).collect();

        for b in &self.bootcamps {
            anyhow::ensure!(user_ids.contains(&b.user), "bootcamp {} references unknown user {}", b.id, b.user);
        }
        for c in &self.courses {
            anyhow::ensure!(bootcamp_ids.contains(&c.bootcamp), "course {} references unknown bootcamp {}", c.id, c.bootcamp);
            anyhow::ensure!(user_ids.contains(&c.user), "course {} references unknown user {}", c.id, c.user);
        }
        for r in &self.reviews {
            anyhow::ensure!(bootcamp_ids.contains(&r.bootcamp), "review {} references unknown bootcamp {}", r.id, r.bootcamp);
            anyhow::ensure!(user_ids.contains(&r.user), "review {} references unknown user {}", r.id, r.user);
            anyhow::ensure!((1..=10).contains(&r.rating), "review {} rating {} is outside 1..=10", r.id, r.rating);
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

pub async fn handle_import(config: &AppConfig, data_dir: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    let data = SeedData::load(data_dir)?;
    data.check_references()?;

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    let result = import(&db, &data).await;
    db.close().await;
    result?;

    output_success(
        &output_format,
        "Data imported",
        Some(json!({
            "users": data.users.len(),
            "bootcamps": data.bootcamps.len(),
            "courses": data.courses.len(),
            "reviews": data.reviews.len(),
        })),
    )
}

pub async fn handle_destroy(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = Database::connect(&config.database).await?;
    let result = destroy(&db).await;
    db.close().await;
    result?;

    output_success(&output_format, "Data destroyed", None)
}

async fn import(db: &Database, data: &SeedData) -> anyhow::Result<()> {
    let mut tx = db.pool().begin().await?;

    for u in &data.users {
        sqlx::query(
            r#"INSERT INTO "users" ("id", "name", "email", "role", "phone", "password")
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(u.id)
        .bind(&u.name)
        .bind(u.email.to_lowercase())
        .bind(u.role.as_str())
        .bind(&u.phone)
        .bind(hash_password(&u.password)?)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to insert user {}", u.email))?;
    }

    for b in &data.bootcamps {
        sqlx::query(
            r#"INSERT INTO "bootcamps"
                ("id", "name", "slug", "description", "website", "email", "phone", "address", "careers",
                 "photo", "housing", "jobAssistance", "jobGuarantee", "acceptGi", "user")
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, 'no-photo.jpg'), $11, $12, $13, $14, $15)"#,
        )
        .bind(b.id)
        .bind(&b.name)
        .bind(crate::services::slugify(&b.name))
        .bind(&b.description)
        .bind(&b.website)
        .bind(&b.email)
        .bind(&b.phone)
        .bind(&b.address)
        .bind(career_strings(&b.careers))
        .bind(&b.photo)
        .bind(b.housing)
        .bind(b.job_assistance)
        .bind(b.job_guarantee)
        .bind(b.accept_gi)
        .bind(b.user)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to insert bootcamp {}", b.name))?;
    }

    for c in &data.courses {
        sqlx::query(
            r#"INSERT INTO "courses"
                ("id", "title", "description", "weeks", "tuition", "minimumSkill", "scholarshipAvailable", "bootcamp", "user")
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(c.id)
        .bind(&c.title)
        .bind(&c.description)
        .bind(&c.weeks)
        .bind(c.tuition)
        .bind(c.minimum_skill.as_str())
        .bind(c.scholarship_available)
        .bind(c.bootcamp)
        .bind(c.user)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to insert course {}", c.title))?;
    }

    for r in &data.reviews {
        sqlx::query(
            r#"INSERT INTO "reviews" ("id", "title", "text", "rating", "bootcamp", "user")
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(r.id)
        .bind(&r.title)
        .bind(&r.text)
        .bind(r.rating)
        .bind(r.bootcamp)
        .bind(r.user)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to insert review {}", r.title))?;
    }

    sqlx::query(
        r#"UPDATE "bootcamps" b SET
            "averageCost" = (SELECT ROUND(AVG("tuition"))::integer FROM "courses" c WHERE c."bootcamp" = b."id"),
            "averageRating" = (SELECT AVG("rating")::double precision FROM "reviews" r WHERE r."bootcamp" = b."id")"#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(
        "Imported {} users, {} bootcamps, {} courses, {} reviews",
        data.users.len(),
        data.bootcamps.len(),
        data.courses.len(),
        data.reviews.len()
    );
    Ok(())
}

async fn destroy(db: &Database) -> anyhow::Result<()> {
    let mut tx = db.pool().begin().await?;
    for table in ["reviews", "courses", "bootcamps", "users"] {
        let deleted = sqlx::query(&format!("DELETE FROM \"{}\"", table))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tracing::info!("Deleted {} rows from {}", deleted, table);
    }
    tx.commit().await?;
    Ok(())
}
