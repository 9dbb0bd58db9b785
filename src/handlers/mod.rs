//! One module per resource under `/api/v1`.
//!
//! Public reads take no credentials. Writes run behind `jwt_auth_middleware`
//! and receive the caller as `AuthUser`; role checks happen in the handler.
pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;
pub mod utils;
