//! Router configuration for the STASH API.

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, download_file, filter_files, get_file, inline_file, list_files,
    list_files_by_user, search_files, stats, upload_file, view_file, AppState,
};
use super::middleware::create_cors_layer;

/// Headroom on top of the file size limit for multipart framing and
/// the other form fields.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    max_upload_size: u64,
) -> Router {
    let file_routes = Router::new()
        .route("/upload", axum::routing::post(upload_file))
        .route("/", get(list_files))
        .route("/user/:user_id", get(list_files_by_user))
        .route("/search", get(search_files))
        .route("/filter", get(filter_files))
        .route("/stats", get(stats))
        .route("/:id", get(get_file).delete(delete_file))
        .route("/:id/download", get(download_file))
        .route("/:id/view", get(view_file))
        .route("/:id/inline", get(inline_file));

    let api_routes = Router::new().nest("/files", file_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .layer(DefaultBodyLimit::max(
            max_upload_size as usize + BODY_LIMIT_SLACK,
        ))
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
