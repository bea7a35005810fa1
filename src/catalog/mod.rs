//! Static model catalog
//!
//! Read-only table of the response-generation configurations the router can
//! pick from. Entries are keyed by model id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub context_window: u32,
}

impl ModelRecord {
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Immutable lookup table of models
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: IndexMap<String, ModelRecord>,
}

impl ModelCatalog {
    /// Build a catalog; later records replace earlier ones with the same id
    pub fn new(records: impl IntoIterator<Item = ModelRecord>) -> Self {
        let models = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self { models }
    }

    /// The three models the server ships with
    pub fn builtin() -> Self {
        Self::new([
            ModelRecord {
                id: "basic-model".to_string(),
                name: "基础模型".to_string(),
                version: "1.0".to_string(),
                description: Some("一个简单的基础模型，适合一般性任务".to_string()),
                capabilities: vec!["text-generation".to_string(), "summarization".to_string()],
                max_tokens: 2000,
                temperature: 0.7,
                context_window: 4000,
            },
            ModelRecord {
                id: "advanced-model".to_string(),
                name: "高级模型".to_string(),
                version: "2.0".to_string(),
                description: Some("一个更强大的模型，支持代码生成和复杂推理".to_string()),
                capabilities: vec![
                    "text-generation".to_string(),
                    "code-generation".to_string(),
                    "reasoning".to_string(),
                ],
                max_tokens: 8000,
                temperature: 0.5,
                context_window: 16000,
            },
            ModelRecord {
                id: "specialized-model".to_string(),
                name: "专业模型".to_string(),
                version: "1.5".to_string(),
                description: Some("为特定领域优化的模型".to_string()),
                capabilities: vec![
                    "domain-specific-generation".to_string(),
                    "classification".to_string(),
                ],
                max_tokens: 4000,
                temperature: 0.3,
                context_window: 8000,
            },
        ])
    }

    pub fn get(&self, id: &str) -> Option<&ModelRecord> {
        self.models.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// All models, in definition order
    pub fn all(&self) -> impl Iterator<Item = &ModelRecord> {
        self.models.values()
    }

    pub fn by_capability<'a>(
        &'a self,
        capability: &'a str,
    ) -> impl Iterator<Item = &'a ModelRecord> {
        self.models.values().filter(move |m| m.has_capability(capability))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
