//! List-query pipeline: translate the query string, window it, and shape
//! the `{ success, count, pagination, data }` envelope.

pub mod paginate;
pub mod translate;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::schema::Resource;
use crate::filter::{Filter, FilterError};

pub use paginate::{PageDescriptor, PageRequest, Pagination};
pub use translate::{parse_query_string, translate, translate_query_string, TranslatedQuery};

/// Result envelope handed to the list handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedResults {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Value>,
}

impl AdvancedResults {
    pub fn new(data: Vec<Value>, pagination: Pagination) -> Self {
        Self { success: true, count: data.len(), pagination, data }
    }
}

/// Apply a translated query and page window to a resource.
pub fn build_filter(
    resource: &'static Resource,
    query: &TranslatedQuery,
    page: &PageRequest,
) -> Result<Filter, FilterError> {
    let mut filter = Filter::new(resource).where_clause(&query.filter)?;
    if let Some(select) = &query.select {
        filter = filter.select(select.clone())?;
    }
    Ok(filter.order(query.sort.clone())?.limit(page.limit(), page.skip()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::BOOTCAMPS;

    #[test]
    fn filter_carries_translated_window() {
        let query = translate_query_string("averageCost[lt]=5000&select=name&sort=name").unwrap();
        let filter = build_filter(&BOOTCAMPS, &query, &PageRequest::new(3, 4)).unwrap();
        assert_eq!(filter.limit_value(), Some(4));
        assert_eq!(filter.offset_value(), Some(8));
        assert_eq!(filter.selected_columns(), vec!["id", "name"]);
    }

    #[test]
    fn unknown_filter_field_is_a_filter_error() {
        let query = translate_query_string("colour=blue").unwrap();
        assert!(build_filter(&BOOTCAMPS, &query, &PageRequest::new(1, 3)).is_err());
    }

    #[test]
    fn envelope_counts_returned_records() {
        let results = AdvancedResults::new(vec![serde_json::json!({ "id": 1 })], Pagination::default());
        assert!(results.success);
        assert_eq!(results.count, 1);
        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            serde_json::json!({ "success": true, "count": 1, "pagination": {}, "data": [{ "id": 1 }] })
        );
    }
}
