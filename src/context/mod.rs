//! Session context management
//!
//! Holds per-session conversational state with merge-update semantics and
//! pull-based expiry.

pub mod models;
pub mod store;
pub mod token_estimator;

pub use models::{Context, ContextItem, ContextMetadata, ContextPatch, LAST_UPDATED_KEY};
pub use store::ContextStore;
pub use token_estimator::{CharRatioEstimator, TokenEstimator};
