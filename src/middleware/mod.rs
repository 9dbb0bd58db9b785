pub mod advanced_results;
pub mod auth;
pub mod response;

pub use advanced_results::{advanced_results_middleware, fetch_advanced_results, AdvancedResultsState};
pub use auth::{authorize, jwt_auth_middleware, require_admin_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult, Listing};
