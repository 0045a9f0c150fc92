use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Multipart uploads are bounded by the configured max file size plus
    // form-encoding overhead; the tower layer enforces it instead of axum's
    // 2 MB default.
    let body_limit = state.config.processing.max_file_size + 1024 * 1024;

    Router::new()
        .route("/upload", post(handlers::documents::upload_document))
        .route("/query", post(handlers::query::query_documents))
        .route("/documents", get(handlers::documents::list_documents))
        .route(
            "/documents/{documentId}",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .route("/health", get(handlers::health::health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
