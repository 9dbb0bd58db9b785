use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, FilterWhereInfo, SqlResult};
use crate::database::schema::Resource;

/// A validated list query over one resource: conditions, projection,
/// ordering and an optional skip/limit window.
#[derive(Debug, Clone)]
pub struct Filter {
    resource: &'static Resource,
    select_columns: Vec<String>,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Filter {
    pub fn new(resource: &'static Resource) -> Self {
        Self {
            resource,
            select_columns: vec![],
            conditions: vec![],
            order_data: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn resource(&self) -> &'static Resource {
        self.resource
    }

    /// Restrict the projection. `id` is always returned.
    pub fn select(mut self, columns: Vec<String>) -> Result<Self, FilterError> {
        let mut selected = vec!["id".to_string()];
        for column in columns {
            if self.resource.column(&column).is_none() {
                return Err(FilterError::InvalidColumn {
                    resource: self.resource.name,
                    field: column,
                });
            }
            if !selected.contains(&column) {
                selected.push(column);
            }
        }
        self.select_columns = selected;
        Ok(self)
    }

    pub fn where_clause(mut self, conditions: &Value) -> Result<Self, FilterError> {
        self.conditions = FilterWhere::parse(self.resource, conditions)?;
        Ok(self)
    }

    /// Sort keys, with `id` appended as a final tie-breaker so equal keys
    /// page deterministically.
    pub fn order(mut self, mut order: Vec<FilterOrderInfo>) -> Result<Self, FilterError> {
        FilterOrder::validate(self.resource, &order)?;
        if !order.iter().any(|o| o.column == "id") {
            order.push(FilterOrderInfo::asc("id"));
        }
        self.order_data = order;
        Ok(self)
    }

    pub fn limit(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    pub fn selected_columns(&self) -> Vec<&str> {
        if self.select_columns.is_empty() {
            self.resource.visible_columns().map(|c| c.name).collect()
        } else {
            self.select_columns.iter().map(String::as_str).collect()
        }
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn order_data(&self) -> &[FilterOrderInfo] {
        &self.order_data
    }

    /// `SELECT row_to_json(t) AS row FROM (SELECT ... ) t`, one JSON object per row.
    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let select_clause = self
            .selected_columns()
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");

        let inner = [
            format!("SELECT {}", select_clause),
            format!("FROM \"{}\"", self.resource.table),
            if where_result.query.is_empty() { String::new() } else { format!("WHERE {}", where_result.query) },
            FilterOrder::generate(&self.order_data),
            self.build_limit_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult {
            query: format!("SELECT row_to_json(t) AS row FROM ({}) t", inner),
            params: where_result.params,
        })
    }

    pub fn to_where_sql(&self) -> Result<SqlResult, FilterError> {
        let (query, params) = FilterWhere::generate(self.resource, &self.conditions, 0)?;
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let query = if where_result.query.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.resource.table)
        } else {
            format!(
                "SELECT COUNT(*) AS count FROM \"{}\" WHERE {}",
                self.resource.table, where_result.query
            )
        };
        Ok(SqlResult { query, params: where_result.params })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) if o > 0 => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), _) => format!("LIMIT {}", l),
            (None, Some(o)) if o > 0 => format!("OFFSET {}", o),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::{BOOTCAMPS, USERS};
    use serde_json::json;

    #[test]
    fn full_query_with_projection_sort_and_window() {
        let filter = Filter::new(&BOOTCAMPS)
            .where_clause(&json!({ "careers": { "$in": ["Web Development"] } }))
            .unwrap()
            .select(vec!["name".into(), "description".into()])
            .unwrap()
            .order(vec![FilterOrderInfo::desc("averageCost")])
            .unwrap()
            .limit(5, 10);

        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT row_to_json(t) AS row FROM (SELECT \"id\", \"name\", \"description\" FROM \"bootcamps\" \
             WHERE \"careers\" && ARRAY[$1]::text[] ORDER BY \"averageCost\" DESC, \"id\" ASC LIMIT 5 OFFSET 10) t"
        );
        assert_eq!(sql.params, vec!["Web Development"]);
    }

    #[test]
    fn id_breaks_ties_once() {
        let filter = Filter::new(&BOOTCAMPS).order(vec![FilterOrderInfo::asc("createdAt")]).unwrap();
        assert_eq!(filter.order_data(), &[FilterOrderInfo::asc("createdAt"), FilterOrderInfo::asc("id")]);

        let filter = Filter::new(&BOOTCAMPS).order(vec![FilterOrderInfo::desc("id")]).unwrap();
        assert_eq!(filter.order_data(), &[FilterOrderInfo::desc("id")]);
    }

    #[test]
    fn default_projection_skips_hidden_columns() {
        let filter = Filter::new(&USERS);
        let columns = filter.selected_columns();
        assert!(columns.contains(&"email"));
        assert!(!columns.contains(&"password"));
        let sql = filter.to_sql().unwrap();
        assert!(!sql.query.contains("password"));
        assert!(!sql.query.contains("WHERE"));
    }

    #[test]
    fn count_ignores_window_and_order() {
        let filter = Filter::new(&BOOTCAMPS)
            .where_clause(&json!({ "housing": "true" }))
            .unwrap()
            .order(vec![FilterOrderInfo::asc("createdAt")])
            .unwrap()
            .limit(3, 3);
        let sql = filter.to_count_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT COUNT(*) AS count FROM \"bootcamps\" WHERE \"housing\" = $1::boolean"
        );
    }

    #[test]
    fn selecting_hidden_column_fails() {
        assert!(Filter::new(&USERS).select(vec!["password".into()]).is_err());
    }
}
