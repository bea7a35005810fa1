//! In-memory session context store
//!
//! Maps session ids to their [`Context`]. Every mutation made through the
//! store stamps `metadata.lastUpdated`, which the expiry sweep relies on.
//! The map is a `DashMap`, so a single store can be shared across request
//! handlers running on different worker threads.

use super::models::{Context, ContextItem, ContextPatch};
use crate::metrics::METRICS;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Session context store
#[derive(Debug, Default)]
pub struct ContextStore {
    contexts: DashMap<String, Context>,
}

impl ContextStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            contexts: DashMap::new(),
        }
    }

    /// Insert or overwrite the context for a session
    pub fn save(&self, session_id: &str, mut context: Context) {
        context.metadata.touch(Utc::now());
        self.contexts.insert(session_id.to_string(), context);

        METRICS.record_session_operation("save", true);
        info!("Saved context for session {}", session_id);
    }

    /// Snapshot of the stored context
    pub fn get(&self, session_id: &str) -> Option<Context> {
        self.contexts.get(session_id).map(|entry| entry.value().clone())
    }

    /// Merge a partial context into an existing session.
    ///
    /// Returns `None` without creating an entry when the session is unknown.
    pub fn update(&self, session_id: &str, patch: ContextPatch) -> Option<Context> {
        let Some(mut entry) = self.contexts.get_mut(session_id) else {
            METRICS.record_session_operation("update", false);
            warn!("No context found for session {}", session_id);
            return None;
        };

        let context = entry.value_mut();
        context.apply_patch(patch);
        context.metadata.touch(Utc::now());
        let updated = context.clone();
        drop(entry);

        METRICS.record_session_operation("update", true);
        info!("Updated context for session {}", session_id);
        Some(updated)
    }

    /// Merge an incoming request into its session, creating the session
    /// when absent.
    ///
    /// Items already stored for the session are kept. Lookup and write
    /// happen under a single entry lock.
    pub fn upsert(&self, session_id: &str, context: Context) -> Context {
        let now = Utc::now();

        match self.contexts.entry(session_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get_mut();
                stored.apply_patch(ContextPatch::from_request(&context));
                stored.metadata.touch(now);
                let merged = stored.clone();
                drop(entry);

                METRICS.record_session_operation("update", true);
                info!("Updated context for session {}", session_id);
                merged
            }
            Entry::Vacant(entry) => {
                let mut context = context;
                context.metadata.touch(now);
                entry.insert(context.clone());

                METRICS.record_session_operation("save", true);
                info!("Saved context for session {}", session_id);
                context
            }
        }
    }

    /// Append an item to a session's context.
    ///
    /// The item keeps a caller-provided timestamp; otherwise it gets the
    /// current time. Returns `None` when the session is unknown.
    pub fn add_item(&self, session_id: &str, mut item: ContextItem) -> Option<Context> {
        let Some(mut entry) = self.contexts.get_mut(session_id) else {
            METRICS.record_session_operation("add_item", false);
            warn!("No context found for session {}", session_id);
            return None;
        };

        let now = Utc::now();
        if item.timestamp.is_none() {
            item.timestamp = Some(now);
        }

        let context = entry.value_mut();
        context.context_items.push(item);
        context.metadata.touch(now);
        let updated = context.clone();
        drop(entry);

        METRICS.record_session_operation("add_item", true);
        info!("Added context item to session {}", session_id);
        Some(updated)
    }

    /// Delete a session; returns whether it existed
    pub fn remove(&self, session_id: &str) -> bool {
        let existed = self.contexts.remove(session_id).is_some();

        METRICS.record_session_operation("remove", existed);
        if existed {
            info!("Removed context for session {}", session_id);
        }

        existed
    }

    /// Drop every session idle for longer than `max_age`
    pub fn sweep_expired(&self, max_age: Duration) -> usize {
        self.sweep_expired_at(Utc::now(), max_age)
    }

    /// Same as [`sweep_expired`](Self::sweep_expired) against an explicit clock.
    ///
    /// Sessions without `lastUpdated` count as age zero and are kept.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        // A max age beyond chrono's range never expires anything
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return 0;
        };
        let mut removed = 0;

        self.contexts.retain(|session_id, context| {
            let age = context
                .metadata
                .last_updated
                .map(|stamp| now.signed_duration_since(stamp))
                .unwrap_or_else(chrono::Duration::zero);

            if age > max_age {
                debug!(
                    "Expiring session {} (idle {}ms)",
                    session_id,
                    age.num_milliseconds()
                );
                removed += 1;
                false
            } else {
                true
            }
        });

        METRICS.record_sweep(removed, self.contexts.len());
        if removed > 0 {
            info!("Cleaned {} expired contexts", removed);
        }

        removed
    }

    /// Number of stored sessions
    pub fn active_count(&self) -> usize {
        self.contexts.len()
    }

    /// Ids of all stored sessions, sorted
    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .contexts
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }
}
