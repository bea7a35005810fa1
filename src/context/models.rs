//! Data models for session contexts

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key the store stamps on every mutation
pub const LAST_UPDATED_KEY: &str = "lastUpdated";

/// State for one conversation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Requested output format; `html` wraps the response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub context_items: Vec<ContextItem>,
    #[serde(default)]
    pub metadata: ContextMetadata,
}

impl Context {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            session_id: None,
            language: None,
            format: None,
            context_items: Vec::new(),
            metadata: ContextMetadata::default(),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Shallow merge of the patch into this context.
    ///
    /// Top-level fields present in the patch replace the current ones;
    /// metadata merges key by key with patch values winning.
    pub fn apply_patch(&mut self, patch: ContextPatch) {
        if let Some(query) = patch.query {
            self.query = query;
        }
        if let Some(session_id) = patch.session_id {
            self.session_id = Some(session_id);
        }
        if let Some(language) = patch.language {
            self.language = Some(language);
        }
        if let Some(format) = patch.format {
            self.format = Some(format);
        }
        if let Some(items) = patch.context_items {
            self.context_items = items;
        }
        if let Some(metadata) = patch.metadata {
            self.metadata.merge(metadata);
        }
    }
}

/// Session metadata: the store-owned timestamp plus an open key/value bag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextMetadata {
    /// Set by the store on every save, update and append
    #[serde(
        rename = "lastUpdated",
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub last_updated: Option<DateTime<Utc>>,
    /// Every other metadata key, in insertion order
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ContextMetadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Insert an auxiliary key. `lastUpdated` is reserved for the store.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if key == LAST_UPDATED_KEY {
            return None;
        }
        self.extra.insert(key, value)
    }

    /// Key-level merge; incoming values overwrite same-named keys
    pub fn merge(&mut self, incoming: IndexMap<String, Value>) {
        for (key, value) in incoming {
            self.insert(key, value);
        }
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = Some(now);
    }
}

/// Sub-record attached to a context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub content: Value,
    /// Assigned by the store on append when left unset
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ContextItem {
    pub fn new(id: impl Into<String>, item_type: impl Into<String>, content: Value) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
            content,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Partial context used by merge-updates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_items: Option<Vec<ContextItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IndexMap<String, Value>>,
}

impl ContextPatch {
    /// Patch carrying the request-level fields of a context.
    ///
    /// Items are left out so an incoming request never drops the items
    /// already stored for the session.
    pub fn from_request(context: &Context) -> Self {
        Self {
            query: Some(context.query.clone()),
            session_id: context.session_id.clone(),
            language: context.language.clone(),
            format: context.format.clone(),
            context_items: None,
            metadata: Some(context.metadata.extra.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_wire_format() {
        let ctx: Context = serde_json::from_value(json!({
            "query": "你好",
            "sessionId": "session-1",
            "metadata": { "clientVersion": "1.0.0", "lastUpdated": 1700000000000i64 }
        }))
        .unwrap();

        assert_eq!(ctx.session_id.as_deref(), Some("session-1"));
        assert!(ctx.language.is_none());
        assert!(ctx.context_items.is_empty());
        assert_eq!(ctx.metadata.last_updated.unwrap().timestamp_millis(), 1_700_000_000_000);
        assert_eq!(ctx.metadata.get("clientVersion"), Some(&json!("1.0.0")));
        assert!(ctx.metadata.get(LAST_UPDATED_KEY).is_none());

        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["metadata"]["lastUpdated"], json!(1700000000000i64));
        assert_eq!(value["metadata"]["clientVersion"], json!("1.0.0"));
        assert!(value.get("language").is_none());
    }

    #[test]
    fn test_item_type_field_name() {
        let item: ContextItem = serde_json::from_value(json!({
            "id": "i1",
            "type": "note",
            "content": { "text": "hello" }
        }))
        .unwrap();
        assert_eq!(item.item_type, "note");
        assert!(item.timestamp.is_none());

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "note");
        assert!(value.get("timestamp").is_none());
    }

    #[test]
    fn test_apply_patch_merges_metadata() {
        let mut ctx = Context::new("first")
            .with_language("en")
            .with_metadata("a", json!(1))
            .with_metadata("b", json!(2));

        let mut metadata = IndexMap::new();
        metadata.insert("b".to_string(), json!(20));
        metadata.insert("c".to_string(), json!(30));

        ctx.apply_patch(ContextPatch {
            query: Some("second".to_string()),
            metadata: Some(metadata),
            ..Default::default()
        });

        assert_eq!(ctx.query, "second");
        assert_eq!(ctx.language.as_deref(), Some("en"));
        assert_eq!(ctx.metadata.get("a"), Some(&json!(1)));
        assert_eq!(ctx.metadata.get("b"), Some(&json!(20)));
        assert_eq!(ctx.metadata.get("c"), Some(&json!(30)));
    }

    #[test]
    fn test_request_patch_carries_format_but_not_items() {
        let mut request = Context::new("hi").with_session("s1").with_format("html");
        request.context_items.push(ContextItem::new("i1", "note", json!(null)));

        let patch = ContextPatch::from_request(&request);
        assert_eq!(patch.format.as_deref(), Some("html"));
        assert!(patch.context_items.is_none());

        let mut stored = Context::new("before");
        stored.apply_patch(patch);
        assert_eq!(stored.format.as_deref(), Some("html"));
        assert!(stored.context_items.is_empty());
    }

    #[test]
    fn test_last_updated_key_is_reserved() {
        let mut metadata = ContextMetadata::default();
        assert!(metadata.insert(LAST_UPDATED_KEY, json!(5)).is_none());
        assert!(metadata.extra.is_empty());
        assert!(metadata.last_updated.is_none());
    }
}
