use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid query: {0}")]
    MalformedQuery(String),

    #[error("Unknown field '{field}' for {resource}")]
    InvalidColumn { resource: &'static str, field: String },

    #[error("Unsupported operator '{operator}' on field '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("Invalid operator data for field '{field}': {reason}")]
    InvalidOperatorData { field: String, reason: String },

    #[error("Invalid WHERE clause: {0}")]
    InvalidWhereClause(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
