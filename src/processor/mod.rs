//! Content processing pipeline
//!
//! A request flows through these stages:
//! - the session store persists or merges the request context
//! - the classifier labels the query
//! - the router resolves a model for the label
//! - the generator renders a templated response
//! - post-processing stamps the response time and applies the output format
//!
//! Only the store holds state between requests.

pub mod classifier;
pub mod generator;
pub mod router;

pub use classifier::{classify, matching_categories, ContentCategory, CLASSIFICATION_RULES};
pub use generator::{detect_code_language, GeneratedResponse, ResponseGenerator, UsageMetadata};
pub use router::{FallbackParams, ModelRouter};

use crate::catalog::ModelCatalog;
use crate::config::ProcessorConfig;
use crate::context::{Context, ContextStore};
use crate::metrics::METRICS;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Metadata key recording when the request entered the pipeline
pub const REQUEST_TIME_KEY: &str = "requestTime";

/// Output format that wraps the response body in a container element
pub const HTML_FORMAT: &str = "html";

/// Current time as RFC 3339 with millisecond precision
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Runs the store → classifier → router → generator pipeline
pub struct ContentProcessor {
    store: Arc<ContextStore>,
    router: ModelRouter,
    generator: ResponseGenerator,
    default_language: String,
}

impl ContentProcessor {
    pub fn new(
        store: Arc<ContextStore>,
        router: ModelRouter,
        generator: ResponseGenerator,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            store,
            router,
            generator,
            default_language: default_language.into(),
        }
    }

    pub fn from_config(
        store: Arc<ContextStore>,
        catalog: Arc<ModelCatalog>,
        config: &ProcessorConfig,
    ) -> Self {
        info!(
            "Content processor initialized: default_model={}, default_language={}",
            config.default_model, config.default_language
        );

        Self::new(
            store,
            ModelRouter::from_config(catalog, config),
            ResponseGenerator::default(),
            config.default_language.clone(),
        )
    }

    /// Fill the default language and stamp the request time
    pub fn preprocess(&self, mut context: Context) -> Context {
        if context.language.is_none() {
            context.language = Some(self.default_language.clone());
        }

        context
            .metadata
            .insert(REQUEST_TIME_KEY, Value::String(iso_timestamp()));

        context
    }

    /// Save a new session or merge the request into an existing one.
    /// Stateless requests are left alone.
    pub fn persist(&self, context: &Context) {
        let Some(session_id) = context.session_id.as_deref() else {
            return;
        };

        let stored = self.store.upsert(session_id, context.clone());
        debug!(
            items = stored.context_items.len(),
            "Persisted session {}", session_id
        );
    }

    /// Stamp the response time and apply the requested output format
    pub fn postprocess(
        &self,
        mut output: GeneratedResponse,
        context: &Context,
    ) -> GeneratedResponse {
        output.metadata.response_time = Some(iso_timestamp());

        if context.format.as_deref() == Some(HTML_FORMAT) {
            output.response = format!("<div class=\"mcp-response\">{}</div>", output.response);
        }

        output
    }

    /// Handle one request end to end
    pub fn process(&self, context: Context) -> GeneratedResponse {
        let context = self.preprocess(context);
        self.persist(&context);

        let category = classify(&context.query);
        info!(content_type = %category, "Identified content type");

        let model = self.router.select(category);
        info!(model = %model.id, "Selected model {}", model.name);

        let output = self.generator.render(category, &context.query, &model);
        debug!(tokens = output.metadata.token_count, "Rendered response");

        METRICS.record_request(category.as_str());
        self.postprocess(output, &context)
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }
}
