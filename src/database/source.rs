use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{Database, DatabaseError};
use crate::database::query_builder::QueryBuilder;
use crate::database::schema::{Populate, BOOTCAMPS, COURSES};
use crate::filter::filter_order::FilterOrder;
use crate::filter::{Filter, FilterOrderInfo};

/// Read side of the data layer: count and fetch records matching a
/// validated [`Filter`]. Records come back as JSON objects restricted to
/// the filter's projection, with related records embedded.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, DatabaseError>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Value>, DatabaseError> {
        let filter = filter.clone().limit(1, 0);
        Ok(self.find(&filter).await?.into_iter().next())
    }
}

#[async_trait]
impl RecordSource for Database {
    async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        let sql = filter.to_count_sql()?;
        let count = QueryBuilder::count(self.pool(), &sql).await?;
        Ok(count.max(0) as u64)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, DatabaseError> {
        let sql = filter.to_sql()?;
        let mut records = QueryBuilder::fetch_json(self.pool(), &sql).await?;
        match filter.resource().populate {
            Some(Populate::Courses) => populate_courses(self.pool(), &mut records).await?,
            Some(Populate::BootcampSummary) => populate_bootcamp_summary(self.pool(), &mut records).await?,
            None => {}
        }
        Ok(records)
    }
}

fn uuid_field(record: &Value, field: &str) -> Option<Uuid> {
    record.get(field)?.as_str()?.parse().ok()
}

fn in_ids_sql(table: &str, columns: &[&str], key: &str, order: &[FilterOrderInfo]) -> String {
    let select = columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ");
    let order = FilterOrder::generate(order);
    format!(
        "SELECT row_to_json(t) AS row FROM (SELECT {} FROM \"{}\" WHERE \"{}\" = ANY($1) {}) t",
        select, table, key, order
    )
}

async fn fetch_by_ids(pool: &PgPool, sql: &str, ids: &[Uuid]) -> Result<Vec<Value>, DatabaseError> {
    tracing::debug!(query = %sql, count = ids.len(), "populate");
    let rows: Vec<(Value,)> = sqlx::query_as(sql).bind(ids).fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(row,)| row).collect())
}

/// Embed each bootcamp's courses as `courses: [...]`.
async fn populate_courses(pool: &PgPool, records: &mut [Value]) -> Result<(), DatabaseError> {
    let ids: Vec<Uuid> = records.iter().filter_map(|r| uuid_field(r, "id")).collect();
    if ids.is_empty() {
        return Ok(());
    }

    let columns: Vec<&str> = COURSES.visible_columns().map(|c| c.name).collect();
    let sql = in_ids_sql(COURSES.table, &columns, "bootcamp", &[FilterOrderInfo::asc("createdAt"), FilterOrderInfo::asc("id")]);

    let mut by_bootcamp: HashMap<Uuid, Vec<Value>> = HashMap::new();
    for course in fetch_by_ids(pool, &sql, &ids).await? {
        if let Some(bootcamp) = uuid_field(&course, "bootcamp") {
            by_bootcamp.entry(bootcamp).or_default().push(course);
        }
    }

    for record in records.iter_mut() {
        let courses = uuid_field(record, "id")
            .and_then(|id| by_bootcamp.remove(&id))
            .unwrap_or_default();
        if let Value::Object(map) = record {
            map.insert("courses".to_string(), Value::Array(courses));
        }
    }
    Ok(())
}

/// Replace `bootcamp: <id>` with `{ id, name, description }`.
async fn populate_bootcamp_summary(pool: &PgPool, records: &mut [Value]) -> Result<(), DatabaseError> {
    let mut ids: Vec<Uuid> = records.iter().filter_map(|r| uuid_field(r, "bootcamp")).collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(());
    }

    let sql = in_ids_sql(BOOTCAMPS.table, &["id", "name", "description"], "id", &[]);
    let summaries: HashMap<Uuid, Value> = fetch_by_ids(pool, &sql, &ids)
        .await?
        .into_iter()
        .filter_map(|b| uuid_field(&b, "id").map(|id| (id, b)))
        .collect();

    for record in records.iter_mut() {
        let Some(summary) = uuid_field(record, "bootcamp").and_then(|id| summaries.get(&id)) else {
            continue;
        };
        if let Value::Object(map) = record {
            map.insert("bootcamp".to_string(), summary.clone());
        }
    }
    Ok(())
}

/// Fetch a single record by id through any source.
pub async fn find_by_id(
    source: &dyn RecordSource,
    filter: Filter,
    id: Uuid,
) -> Result<Option<Value>, DatabaseError> {
    let mut conditions = Map::new();
    conditions.insert("id".to_string(), Value::String(id.to_string()));
    let filter = filter.where_clause(&Value::Object(conditions))?;
    source.find_one(&filter).await
}

