//! Query-string → filter specification.
//!
//! The reserved keys control projection, ordering and paging; everything
//! else becomes a filter. Comparison sub-keys (`cost[lte]=1000`) are
//! rewritten to the `$`-prefixed operator form the WHERE builder reads.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::filter::filter_order::FilterOrder;
use crate::filter::{FilterError, FilterOrderInfo};

pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "perpage"];

pub const DEFAULT_SORT_FIELD: &str = "createdAt";

/// Whole-token match on a serialized object key, so `"in":` is rewritten
/// but `"ingest":` and string values are left alone.
static OPERATOR_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(gt|gte|lt|lte|in)":"#).expect("operator pattern"));

#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
    pub filter: Value,
    /// `None` means every visible field.
    pub select: Option<Vec<String>>,
    pub sort: Vec<FilterOrderInfo>,
    pub page: Option<String>,
    pub perpage: Option<String>,
}

/// Parse a raw query string into a nested JSON object. `a[b]=1` nests,
/// `a[]=1` appends, and a repeated key collects its values into an array.
pub fn parse_query_string(raw: &str) -> Map<String, Value> {
    let mut params = Map::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        let path = split_key(&key);
        insert_path(&mut params, &path, Value::String(value.into_owned()));
    }
    params
}

fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    let (head, mut rest) = key.split_at(open);
    let mut path = vec![head.to_string()];
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(close) => {
                path.push(stripped[..close].to_string());
                rest = &stripped[close + 1..];
            }
            None => {
                // Unbalanced bracket: keep the raw key intact
                return vec![key.to_string()];
            }
        }
    }
    if !rest.is_empty() {
        return vec![key.to_string()];
    }
    path
}

fn insert_path(target: &mut Map<String, Value>, path: &[String], value: Value) {
    let (head, tail) = match path.split_first() {
        Some(split) => split,
        None => return,
    };

    if tail.is_empty() {
        merge_value(target, head, value);
        return;
    }

    if tail.len() == 1 && tail[0].is_empty() {
        // `key[]=value`
        let entry = target.entry(head.clone()).or_insert_with(|| Value::Array(vec![]));
        match entry {
            Value::Array(items) => items.push(value),
            other => {
                let previous = other.take();
                *other = Value::Array(vec![previous, value]);
            }
        }
        return;
    }

    let entry = target.entry(head.clone()).or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        // A plain value and a nested one share a key; the nested form wins
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        insert_path(child, tail, value);
    }
}

fn merge_value(target: &mut Map<String, Value>, key: &str, value: Value) {
    match target.get_mut(key) {
        None => {
            target.insert(key.to_string(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
    }
}

/// Rewrite comparison keys to their operator form over the serialized text.
pub fn rewrite_operators(filter_text: &str) -> String {
    OPERATOR_KEY
        .replace_all(filter_text, |caps: &Captures| format!("\"${}\":", &caps[1]))
        .into_owned()
}

/// Translate parsed query parameters into filter, projection and sort.
pub fn translate(params: &Map<String, Value>) -> Result<TranslatedQuery, FilterError> {
    let mut filter_params = params.clone();
    for key in RESERVED_KEYS {
        filter_params.remove(key);
    }

    let filter_text = serde_json::to_string(&Value::Object(filter_params))?;
    let rewritten = rewrite_operators(&filter_text);
    let mut filter: Value = serde_json::from_str(&rewritten)
        .map_err(|e| FilterError::MalformedQuery(format!("{} ({})", rewritten, e)))?;
    normalize_in_values(&mut filter);

    let select = reserved_string(params, "select").and_then(|s| {
        let fields: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if fields.is_empty() { None } else { Some(fields) }
    });

    let sort = match reserved_string(params, "sort") {
        Some(s) => FilterOrder::parse_sort_string(&s),
        None => vec![],
    };
    let sort = if sort.is_empty() { vec![FilterOrderInfo::asc(DEFAULT_SORT_FIELD)] } else { sort };

    Ok(TranslatedQuery {
        filter,
        select,
        sort,
        page: reserved_string(params, "page"),
        perpage: reserved_string(params, "perpage"),
    })
}

/// Convenience for a raw query string.
pub fn translate_query_string(raw: &str) -> Result<TranslatedQuery, FilterError> {
    translate(&parse_query_string(raw))
}

/// Reserved keys are plain strings; a repeated key keeps its last value.
fn reserved_string(params: &Map<String, Value>, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().rev().find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}

/// `$in` always carries a list: `"a,b"` becomes `["a", "b"]`.
fn normalize_in_values(filter: &mut Value) {
    let Value::Object(fields) = filter else { return };
    for condition in fields.values_mut() {
        let Value::Object(ops) = condition else { continue };
        if let Some(in_value) = ops.get_mut("$in") {
            if let Value::String(s) = in_value {
                let items = s
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect();
                *in_value = Value::Array(items);
            }
        }
    }
}
