//! Request and response payloads for the HTTP API

use crate::catalog::ModelRecord;
use crate::context::{Context, ContextItem};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Machine-readable error codes
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Incoming processing request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpRequest {
    /// Missing or empty queries are answered with the plain text template
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub metadata: Option<IndexMap<String, Value>>,
}

impl From<McpRequest> for Context {
    fn from(request: McpRequest) -> Self {
        let mut context = Context::new(request.query);
        context.session_id = request.session_id;
        context.language = request.language;
        context.format = request.format;
        if let Some(metadata) = request.metadata {
            context.metadata.merge(metadata);
        }
        context
    }
}

/// GET /api/stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub active_sessions: usize,
    pub server_status: String,
    /// RFC 3339, millisecond precision
    pub timestamp: String,
}

/// POST /api/maintenance/cleanup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub cleaned_sessions: usize,
    pub timestamp: String,
}

/// GET /api/sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<String>,
    pub total: usize,
}

/// DELETE /api/sessions/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub removed: bool,
}

/// POST /api/sessions/:id/items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItemRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<NewItemRequest> for ContextItem {
    fn from(request: NewItemRequest) -> Self {
        let id = request
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        ContextItem {
            id,
            item_type: request.item_type,
            content: request.content,
            timestamp: request.timestamp,
        }
    }
}

/// GET /api/models query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelQuery {
    #[serde(default)]
    pub capability: Option<String>,
}

/// GET /api/models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelListResponse {
    pub models: Vec<ModelRecord>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_into_context() {
        let request: McpRequest = serde_json::from_value(json!({
            "query": "你好，这是一个测试请求",
            "sessionId": "session-42",
            "language": "zh",
            "metadata": { "clientVersion": "1.0.0", "timestamp": 1700000000000i64 }
        }))
        .unwrap();

        let context: Context = request.into();
        assert_eq!(context.session_id.as_deref(), Some("session-42"));
        assert_eq!(context.metadata.get("clientVersion"), Some(&json!("1.0.0")));
        assert!(context.metadata.last_updated.is_none());
    }

    #[test]
    fn test_request_cannot_set_last_updated() {
        let request: McpRequest = serde_json::from_value(json!({
            "query": "hi",
            "metadata": { "lastUpdated": 1 }
        }))
        .unwrap();

        let context: Context = request.into();
        assert!(context.metadata.last_updated.is_none());
        assert!(context.metadata.extra.is_empty());
    }

    #[test]
    fn test_request_without_query_defaults_to_empty() {
        let request: McpRequest =
            serde_json::from_value(json!({ "sessionId": "s1", "format": "html" })).unwrap();

        let context: Context = request.into();
        assert_eq!(context.query, "");
        assert_eq!(context.format.as_deref(), Some("html"));
    }

    #[test]
    fn test_new_item_gets_generated_id() {
        let request: NewItemRequest =
            serde_json::from_value(json!({ "type": "note", "content": "hello" })).unwrap();
        let item: ContextItem = request.into();

        assert!(uuid::Uuid::parse_str(&item.id).is_ok());
        assert_eq!(item.item_type, "note");
        assert!(item.timestamp.is_none());
    }

    #[test]
    fn test_api_error_shape() {
        let value = serde_json::to_value(ApiError::new(error_codes::NOT_FOUND, "gone")).unwrap();
        assert_eq!(value, json!({ "code": "NOT_FOUND", "message": "gone" }));
    }
}
