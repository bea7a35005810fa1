//! HTTP handlers for the processing, session and maintenance endpoints

use super::models::{
    error_codes, ApiError, CleanupResponse, McpRequest, ModelListResponse, ModelQuery,
    NewItemRequest, RemoveResponse, SessionListResponse, StatsResponse,
};
use crate::catalog::ModelCatalog;
use crate::config::{Config, SessionConfig};
use crate::context::{Context, ContextPatch, ContextStore};
use crate::metrics::METRICS;
use crate::processor::{iso_timestamp, ContentProcessor, GeneratedResponse};
use crate::time_operation;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Handler error: status plus JSON body
pub type ApiFailure = (StatusCode, Json<ApiError>);

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContextStore>,
    pub catalog: Arc<ModelCatalog>,
    pub processor: Arc<ContentProcessor>,
    pub session: SessionConfig,
}

impl AppState {
    /// Build the store, catalog and processor for a configuration
    pub fn new(config: &Config) -> Self {
        let store = Arc::new(ContextStore::new());
        let catalog = Arc::new(ModelCatalog::builtin());
        let processor = Arc::new(ContentProcessor::from_config(
            store.clone(),
            catalog.clone(),
            &config.processor,
        ));

        Self {
            store,
            catalog,
            processor,
            session: config.session.clone(),
        }
    }
}

fn not_found(session_id: &str) -> ApiFailure {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(
            error_codes::NOT_FOUND,
            format!("Session {} not found", session_id),
        )),
    )
}

/// Process a query
///
/// POST /api/mcp
pub async fn process_request(
    State(state): State<AppState>,
    Json(request): Json<McpRequest>,
) -> Json<GeneratedResponse> {
    info!(
        "Processing request: session={}",
        request.session_id.as_deref().unwrap_or("-")
    );

    let context: Context = request.into();
    let output = time_operation!("process", state.processor.process(context));

    Json(output)
}

/// Server statistics
///
/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let active_sessions = state.store.active_count();
    METRICS.set_active_sessions(active_sessions);

    Json(StatsResponse {
        active_sessions,
        server_status: "healthy".to_string(),
        timestamp: iso_timestamp(),
    })
}

/// Sweep sessions idle longer than the configured maximum age
///
/// POST /api/maintenance/cleanup
pub async fn cleanup_sessions(State(state): State<AppState>) -> Json<CleanupResponse> {
    let cleaned_sessions = time_operation!(
        "cleanup",
        state.store.sweep_expired(state.session.max_age())
    );

    info!("Maintenance sweep removed {} sessions", cleaned_sessions);

    Json(CleanupResponse {
        success: true,
        cleaned_sessions,
        timestamp: iso_timestamp(),
    })
}

/// List stored session ids
///
/// GET /api/sessions
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions = state.store.session_ids();
    let total = sessions.len();

    Json(SessionListResponse { sessions, total })
}

/// Fetch a stored session
///
/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Context>, ApiFailure> {
    state
        .store
        .get(&session_id)
        .map(Json)
        .ok_or_else(|| not_found(&session_id))
}

/// Merge fields into a stored session
///
/// PATCH /api/sessions/:id
pub async fn patch_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(patch): Json<ContextPatch>,
) -> Result<Json<Context>, ApiFailure> {
    state
        .store
        .update(&session_id, patch)
        .map(Json)
        .ok_or_else(|| not_found(&session_id))
}

/// Append an item to a stored session
///
/// POST /api/sessions/:id/items
pub async fn add_session_item(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<NewItemRequest>,
) -> Result<Json<Context>, ApiFailure> {
    if request.item_type.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                error_codes::VALIDATION_ERROR,
                "Item type cannot be empty",
            )),
        ));
    }

    state
        .store
        .add_item(&session_id, request.into())
        .map(Json)
        .ok_or_else(|| not_found(&session_id))
}

/// Delete a stored session
///
/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<RemoveResponse> {
    let removed = state.store.remove(&session_id);
    if !removed {
        warn!("Delete requested for unknown session {}", session_id);
    }
    Json(RemoveResponse { removed })
}

/// List catalog models, optionally filtered by capability
///
/// GET /api/models
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> Json<ModelListResponse> {
    let models: Vec<_> = match query.capability.as_deref() {
        Some(capability) => state.catalog.by_capability(capability).cloned().collect(),
        None => state.catalog.all().cloned().collect(),
    };
    let total = models.len();

    Json(ModelListResponse { models, total })
}

/// Prometheus exposition
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    METRICS.set_active_sessions(state.store.active_count());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}

/// Landing page
///
/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>MCP服务器</title>
    <style>
      body { font-family: Arial, sans-serif; margin: 40px; line-height: 1.6; }
      .container { max-width: 800px; margin: 0 auto; }
      .endpoint { background: #f4f4f4; padding: 10px; border-radius: 4px; margin: 10px 0; }
    </style>
  </head>
  <body>
    <div class="container">
      <h1>MCP服务器正在运行</h1>
      <h2>可用端点:</h2>
      <div class="endpoint"><strong>MCP API:</strong> <code>POST /api/mcp</code></div>
      <div class="endpoint"><strong>服务器状态:</strong> <code>GET /api/stats</code></div>
      <div class="endpoint"><strong>清理会话:</strong> <code>POST /api/maintenance/cleanup</code></div>
      <div class="endpoint"><strong>会话列表:</strong> <code>GET /api/sessions</code></div>
      <div class="endpoint"><strong>会话:</strong> <code>GET|PATCH|DELETE /api/sessions/:id</code></div>
      <div class="endpoint"><strong>会话条目:</strong> <code>POST /api/sessions/:id/items</code></div>
      <div class="endpoint"><strong>模型:</strong> <code>GET /api/models</code></div>
      <div class="endpoint"><strong>指标:</strong> <code>GET /metrics</code></div>
      <h2>测试示例:</h2>
      <pre>curl -X POST http://localhost:3000/api/mcp \
  -H "Content-Type: application/json" \
  -d '{"query": "生成一个Python示例代码", "sessionId": "test-session"}'</pre>
    </div>
  </body>
</html>
"#;
