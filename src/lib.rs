//! Session context store and content routing server
//!
//! Keeps per-session conversational state in memory and answers free-text
//! queries with templated responses. Each query is classified by keyword
//! rules, routed to a model from a static catalog and rendered with the
//! template for its category.

pub mod api;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod observability;
pub mod processor;

pub use catalog::{ModelCatalog, ModelRecord};
pub use crate::config::Config;
pub use context::{Context, ContextItem, ContextPatch, ContextStore};
pub use error::{ContextError, Result};
pub use processor::{classify, ContentCategory, ContentProcessor};
