#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{Map, Value};
use tower::ServiceExt;

use bootcamp_api::config::AppConfig;
use bootcamp_api::database::{Database, DatabaseError, RecordSource};
use bootcamp_api::filter::{Filter, FilterOp, FilterWhereInfo, SortDirection};
use bootcamp_api::{app, AppState};

/// In-memory record source. Applies conditions, ordering, the page window
/// and projection the way the SQL source does, without populate.
#[derive(Default)]
pub struct MemoryRecords {
    records: Vec<Value>,
}

impl MemoryRecords {
    pub fn new(records: Vec<Value>) -> Self {
        Self { records }
    }

    fn matching(&self, filter: &Filter) -> Vec<&Value> {
        self.records
            .iter()
            .filter(|r| filter.conditions().iter().all(|c| matches_condition(r, c)))
            .collect()
    }
}

#[async_trait]
impl RecordSource for MemoryRecords {
    async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        Ok(self.matching(filter).len() as u64)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, DatabaseError> {
        let mut records = self.matching(filter);
        records.sort_by(|a, b| {
            for order in filter.order_data() {
                let ord = compare(&a[&order.column], &b[&order.column]);
                let ord = if order.sort == SortDirection::Desc { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        let skip = filter.offset_value().unwrap_or(0) as usize;
        let take = filter.limit_value().map(|l| l as usize).unwrap_or(usize::MAX);
        let columns = filter.selected_columns();

        Ok(records
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|record| {
                let projected: Map<String, Value> = columns
                    .iter()
                    .filter_map(|c| record.get(*c).map(|v| (c.to_string(), v.clone())))
                    .collect();
                Value::Object(projected)
            })
            .collect())
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => as_text(a).cmp(&as_text(b)),
    }
}

fn matches_condition(record: &Value, condition: &FilterWhereInfo) -> bool {
    let field = &record[&condition.column];
    match condition.operator {
        FilterOp::Eq if condition.data.is_null() => field.is_null(),
        FilterOp::Eq => match field {
            Value::Array(items) => items.iter().any(|i| as_text(i) == as_text(&condition.data)),
            other => as_text(other) == as_text(&condition.data),
        },
        FilterOp::In => {
            let wanted: Vec<String> = match &condition.data {
                Value::Array(values) => values.iter().map(as_text).collect(),
                other => as_text(other).split(',').map(|s| s.trim().to_string()).collect(),
            };
            match field {
                Value::Array(items) => items.iter().any(|i| wanted.contains(&as_text(i))),
                other => wanted.contains(&as_text(other)),
            }
        }
        op => {
            let (Some(x), Some(y)) = (as_number(field), as_number(&condition.data)) else {
                return false;
            };
            match op {
                FilterOp::Gt => x > y,
                FilterOp::Gte => x >= y,
                FilterOp::Lt => x < y,
                FilterOp::Lte => x <= y,
                _ => false,
            }
        }
    }
}

/// Router over the given read records. The write pool is lazy and never
/// reachable in these tests.
pub fn test_app(records: MemoryRecords) -> Result<Router> {
    let config = AppConfig::test();
    let db = Database::connect_lazy(&config.database).context("lazy pool")?;
    Ok(app(AppState::with_records(db, Arc::new(records), config)))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub fn get_with_header(uri: &str, name: header::HeaderName, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .expect("request")
}

pub fn send_json(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn call(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let (status, _, body) = call_with_headers(app, request).await?;
    Ok((status, body))
}

pub async fn call_with_headers(
    app: Router,
    request: Request<Body>,
) -> Result<(StatusCode, axum::http::HeaderMap, Value)> {
    let response = app.oneshot(request).await.context("router call")?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, headers, body))
}

pub fn bootcamps() -> Vec<Value> {
    serde_json::from_str(include_str!("bootcamps.json")).expect("bootcamp fixtures")
}
