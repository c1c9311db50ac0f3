// ABOUTME: HTTP API layer for ProfileHub providing REST endpoints and routing
// ABOUTME: Integration layer that wires user workflows onto axum routes

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod error;
pub mod health;
pub mod service;
pub mod state;
pub mod users_handlers;

pub use error::{ApiError, ApiResult};
pub use service::UserService;
pub use state::AppState;

/// Multipart framing allowance on top of the picture size limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Creates the users API router
pub fn create_users_router(max_upload_bytes: usize) -> Router<AppState> {
    // Twice the picture limit so oversized files reach the pipeline and get its error
    let upload_body_limit = max_upload_bytes
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(users_handlers::list_users))
        .route("/", post(users_handlers::create_user))
        .route("/{id}", get(users_handlers::get_user))
        .route("/{id}", put(users_handlers::update_user))
        .route(
            "/{id}/professional-status",
            put(users_handlers::update_professional_status),
        )
        .route(
            "/{id}/upload-profile-picture",
            post(users_handlers::upload_profile_picture)
                .layer(DefaultBodyLimit::max(upload_body_limit)),
        )
}

/// Creates the full application router
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.users.max_upload_bytes();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/register", post(users_handlers::register))
        .route(
            "/verify-email/{user_id}/{token}",
            get(users_handlers::verify_email),
        )
        .nest("/users", create_users_router(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
