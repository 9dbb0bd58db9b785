use serde_json::Value;
use sqlx::{PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::SqlResult;

/// Executes generated SQL with its text parameters bound in order.
pub struct QueryBuilder;

impl QueryBuilder {
    /// Run a `SELECT row_to_json(t) AS row ...` statement.
    pub async fn fetch_json(pool: &PgPool, sql: &SqlResult) -> Result<Vec<Value>, DatabaseError> {
        tracing::debug!(query = %sql.query, params = ?sql.params, "fetch");
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(p.as_str());
        }
        let rows = q.fetch_all(pool).await?;
        rows.into_iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }

    pub async fn count(pool: &PgPool, sql: &SqlResult) -> Result<i64, DatabaseError> {
        tracing::debug!(query = %sql.query, params = ?sql.params, "count");
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(p.as_str());
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}
