//! Category to model routing

use super::classifier::ContentCategory;
use crate::catalog::{ModelCatalog, ModelRecord};
use crate::config::ProcessorConfig;
use crate::metrics::METRICS;
use std::sync::Arc;
use tracing::{debug, warn};

/// Defaults used to synthesize a record for ids missing from the catalog
#[derive(Debug, Clone, Copy)]
pub struct FallbackParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Picks a model for each content category
pub struct ModelRouter {
    catalog: Arc<ModelCatalog>,
    default_model: String,
    fallback: FallbackParams,
}

impl ModelRouter {
    pub fn new(
        catalog: Arc<ModelCatalog>,
        default_model: impl Into<String>,
        fallback: FallbackParams,
    ) -> Self {
        let default_model = default_model.into();
        if !catalog.contains(&default_model) {
            warn!(
                "Default model {} is not in the catalog; text queries will use fallback parameters",
                default_model
            );
        }

        Self {
            catalog,
            default_model,
            fallback,
        }
    }

    pub fn from_config(catalog: Arc<ModelCatalog>, config: &ProcessorConfig) -> Self {
        Self::new(
            catalog,
            config.default_model.clone(),
            FallbackParams {
                temperature: config.fallback_temperature,
                max_tokens: config.fallback_max_tokens,
            },
        )
    }

    /// Model id for a category
    pub fn route(&self, category: ContentCategory) -> &str {
        match category {
            ContentCategory::Code => "advanced-model",
            ContentCategory::Creative => "basic-model",
            ContentCategory::Analytical => "specialized-model",
            ContentCategory::Text => self.default_model.as_str(),
        }
    }

    /// Look a model up, synthesizing a record when the id is unknown
    pub fn resolve(&self, model_id: &str) -> ModelRecord {
        if let Some(record) = self.catalog.get(model_id) {
            return record.clone();
        }

        METRICS.record_model_fallback();
        debug!("Model {} not in catalog, using fallback parameters", model_id);

        ModelRecord {
            id: model_id.to_string(),
            name: model_id.to_string(),
            version: String::new(),
            description: None,
            capabilities: Vec::new(),
            max_tokens: self.fallback.max_tokens,
            temperature: self.fallback.temperature,
            context_window: self.fallback.max_tokens,
        }
    }

    /// Route and resolve in one step
    pub fn select(&self, category: ContentCategory) -> ModelRecord {
        self.resolve(self.route(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(default_model: &str) -> ModelRouter {
        ModelRouter::new(
            Arc::new(ModelCatalog::builtin()),
            default_model,
            FallbackParams {
                temperature: 0.7,
                max_tokens: 2000,
            },
        )
    }

    #[test]
    fn test_route_table() {
        let router = router("basic-model");
        assert_eq!(router.route(ContentCategory::Code), "advanced-model");
        assert_eq!(router.route(ContentCategory::Creative), "basic-model");
        assert_eq!(router.route(ContentCategory::Analytical), "specialized-model");
        assert_eq!(router.route(ContentCategory::Text), "basic-model");
    }

    #[test]
    fn test_text_uses_configured_default() {
        let router = router("advanced-model");
        assert_eq!(router.route(ContentCategory::Text), "advanced-model");
        assert_eq!(router.select(ContentCategory::Text).name, "高级模型");
    }

    #[test]
    fn test_resolve_known_model() {
        let record = router("basic-model").resolve("specialized-model");
        assert_eq!(record.name, "专业模型");
        assert_eq!(record.temperature, 0.3);
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let record = router("basic-model").resolve("mystery-model");
        assert_eq!(record.id, "mystery-model");
        assert_eq!(record.name, "mystery-model");
        assert_eq!(record.temperature, 0.7);
        assert_eq!(record.max_tokens, 2000);
        assert!(record.capabilities.is_empty());
    }

    #[test]
    fn test_unknown_default_model_still_routes() {
        let router = router("house-model");
        let record = router.select(ContentCategory::Text);
        assert_eq!(record.id, "house-model");
        assert_eq!(record.name, "house-model");
    }
}
