pub mod manager;
pub mod models;
pub mod query_builder;
pub mod schema;
pub mod source;

pub use manager::{Database, DatabaseError};
pub use source::RecordSource;
