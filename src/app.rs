use std::sync::Arc;

use axum::{
    extract::State,
    handler::Handler,
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::schema::{BOOTCAMPS, COURSES, REVIEWS, USERS};
use crate::database::{Database, RecordSource};
use crate::handlers::{auth, bootcamps, courses, reviews, users};
use crate::middleware::{
    advanced_results_middleware, jwt_auth_middleware, require_admin_middleware, AdvancedResultsState,
};

/// Shared per-process state. The pool is opened once at startup and closed
/// on shutdown; `records` is the read path used by list and show endpoints.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub records: Arc<dyn RecordSource>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            records: Arc::new(db.clone()),
            db,
            config: Arc::new(config),
        }
    }

    /// Writes go to `db`, reads to `records`.
    pub fn with_records(db: Database, records: Arc<dyn RecordSource>, config: AppConfig) -> Self {
        Self { db, records, config: Arc::new(config) }
    }
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(bootcamp_routes(&state))
        .merge(course_routes(&state))
        .merge(review_routes(&state))
        .merge(auth_routes(&state))
        .merge(user_routes(&state));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api)
        // Global middleware
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn bootcamp_routes(state: &AppState) -> Router<AppState> {
    let auth = || from_fn_with_state(state.clone(), jwt_auth_middleware);
    let listing = from_fn_with_state(AdvancedResultsState::new(state, &BOOTCAMPS), advanced_results_middleware);

    Router::new()
        .route(
            "/bootcamps",
            get(bootcamps::list.layer(listing)).post(bootcamps::create.layer(auth())),
        )
        .route(
            "/bootcamps/:id",
            get(bootcamps::get_one)
                .put(bootcamps::update.layer(auth()))
                .delete(bootcamps::delete.layer(auth())),
        )
        // Nested collections share the `:id` segment name with the route above
        .route(
            "/bootcamps/:id/courses",
            get(courses::list_for_bootcamp).post(courses::create.layer(auth())),
        )
        .route(
            "/bootcamps/:id/reviews",
            get(reviews::list_for_bootcamp).post(reviews::create.layer(auth())),
        )
}

fn course_routes(state: &AppState) -> Router<AppState> {
    let auth = || from_fn_with_state(state.clone(), jwt_auth_middleware);
    let listing = from_fn_with_state(AdvancedResultsState::new(state, &COURSES), advanced_results_middleware);

    Router::new()
        .route(
            "/courses",
            get(courses::list.layer(listing)).post(courses::create_without_bootcamp),
        )
        .route(
            "/courses/:id",
            get(courses::get_one)
                .put(courses::update.layer(auth()))
                .delete(courses::delete.layer(auth())),
        )
}

fn review_routes(state: &AppState) -> Router<AppState> {
    let auth = || from_fn_with_state(state.clone(), jwt_auth_middleware);
    let listing = from_fn_with_state(AdvancedResultsState::new(state, &REVIEWS), advanced_results_middleware);

    Router::new()
        .route("/reviews", get(reviews::list.layer(listing)))
        .route(
            "/reviews/:id",
            get(reviews::get_one)
                .put(reviews::update.layer(auth()))
                .delete(reviews::delete.layer(auth())),
        )
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/updatedetails", put(auth::update_details))
        .route("/auth/updatepassword", put(auth::update_password))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", get(auth::logout))
        .merge(protected)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let listing = from_fn_with_state(AdvancedResultsState::new(state, &USERS), advanced_results_middleware);

    // Layers run bottom-up: authenticate, then require admin.
    Router::new()
        .route("/users", get(users::list.layer(listing)).post(users::create))
        .route(
            "/users/:id",
            get(users::get_one).put(users::update).delete(users::delete),
        )
        .route_layer(from_fn(require_admin_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Bootcamp API",
            "version": version,
            "description": "Bootcamp directory REST API",
            "endpoints": {
                "bootcamps": "/api/v1/bootcamps[/:id] (public reads, publisher/admin writes)",
                "courses": "/api/v1/courses[/:id], /api/v1/bootcamps/:id/courses",
                "reviews": "/api/v1/reviews[/:id], /api/v1/bootcamps/:id/reviews",
                "auth": "/api/v1/auth/register, /login, /logout, /me, /updatedetails, /updatepassword",
                "users": "/api/v1/users[/:id] (admin)",
            },
            "query": {
                "filter": "field=value, field[gt|gte|lt|lte|in]=value",
                "select": "select=field1,field2",
                "sort": "sort=-field1,field2",
                "pagination": "page=N&perpage=M",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": true,
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
