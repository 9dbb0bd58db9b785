//! Generic list preprocessing for the collection endpoints.
//!
//! Translates the query string, counts the matching records, fetches the
//! requested page and leaves an [`AdvancedResults`] envelope in the request
//! extensions for the list handler to write out.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::config::PaginationConfig;
use crate::database::schema::Resource;
use crate::database::RecordSource;
use crate::error::ApiError;
use crate::query::{build_filter, translate_query_string, AdvancedResults, PageRequest};

#[derive(Clone)]
pub struct AdvancedResultsState {
    pub records: Arc<dyn RecordSource>,
    pub pagination: PaginationConfig,
    pub resource: &'static Resource,
}

impl AdvancedResultsState {
    pub fn new(state: &AppState, resource: &'static Resource) -> Self {
        Self {
            records: state.records.clone(),
            pagination: state.config.pagination.clone(),
            resource,
        }
    }
}

pub async fn advanced_results_middleware(
    State(state): State<AdvancedResultsState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw_query = request.uri().query().unwrap_or("").to_string();
    let results = fetch_advanced_results(
        state.records.as_ref(),
        state.resource,
        &raw_query,
        &state.pagination,
    )
    .await?;

    request.extensions_mut().insert(results);
    Ok(next.run(request).await)
}

/// Count and fetch run concurrently; the window is computed from the
/// filtered total.
pub async fn fetch_advanced_results(
    records: &dyn RecordSource,
    resource: &'static Resource,
    raw_query: &str,
    pagination: &PaginationConfig,
) -> Result<AdvancedResults, ApiError> {
    let query = translate_query_string(raw_query)?;
    let page = PageRequest::from_params(query.page.as_deref(), query.perpage.as_deref(), pagination);
    let filter = build_filter(resource, &query, &page)?;

    tracing::debug!(
        resource = resource.name,
        page = page.page,
        perpage = page.perpage,
        "advanced results"
    );

    let (total, data) = futures::future::try_join(records.count(&filter), records.find(&filter))
        .await
        .map_err(ApiError::from)?;

    Ok(AdvancedResults::new(data, page.paginate(total)))
}
