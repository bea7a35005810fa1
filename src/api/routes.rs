//! Router construction

use super::handlers::{
    add_session_item, cleanup_sessions, delete_session, get_session, get_stats, index,
    list_models, list_sessions, metrics_handler, patch_session, process_request, AppState,
};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn build_router(state: AppState, max_body_size: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/mcp", post(process_request))
        .route("/api/stats", get(get_stats))
        .route("/api/maintenance/cleanup", post(cleanup_sessions))
        .route("/api/sessions", get(list_sessions))
        .route(
            "/api/sessions/:id",
            get(get_session).patch(patch_session).delete(delete_session),
        )
        .route("/api/sessions/:id/items", post(add_session_item))
        .route("/api/models", get(list_models))
        .route("/metrics", get(metrics_handler))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
