pub mod analyze;
pub mod health;

use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use tower_http::services::ServeDir;

use crate::state::AppState;

/// Upper bound on an upload (resume file plus form fields).
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// API routes, with any other path served from `static_dir` (the browser UI
/// lives at `/`).
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/analyze",
            post(analyze::handle_analyze).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}
