//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, CounterVec, HistogramVec, IntCounter, IntCounterVec,
    IntGauge, Opts, Registry,
};
use crate::error::Result;
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> =
    Lazy::new(|| Arc::new(Metrics::new().expect("Failed to initialize metrics")));

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Pipeline metrics
    pub requests: CounterVec,
    pub request_duration: HistogramVec,
    pub model_fallbacks: IntCounter,

    // Session store metrics
    pub session_operations: IntCounterVec,
    pub sessions_expired: IntCounter,
    pub active_sessions: IntGauge,
}

impl Metrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = register_counter_vec_with_registry!(
            Opts::new("mcp_requests_total", "Total processed requests by content type"),
            &["content_type"],
            registry
        )?;

        let request_duration = register_histogram_vec_with_registry!(
            "mcp_request_duration_seconds",
            "API request duration in seconds",
            &["endpoint"],
            registry
        )?;

        let model_fallbacks = register_int_counter_with_registry!(
            Opts::new(
                "mcp_model_fallbacks_total",
                "Routing decisions that used synthesized model defaults"
            ),
            registry
        )?;

        let session_operations = register_int_counter_vec_with_registry!(
            Opts::new("session_operations_total", "Session store operations"),
            &["operation", "outcome"],
            registry
        )?;

        let sessions_expired = register_int_counter_with_registry!(
            Opts::new("sessions_expired_total", "Sessions removed by the expiry sweep"),
            registry
        )?;

        let active_sessions = register_int_gauge_with_registry!(
            Opts::new("active_sessions", "Sessions currently held in memory"),
            registry
        )?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            requests,
            request_duration,
            model_fallbacks,
            session_operations,
            sessions_expired,
            active_sessions,
        })
    }

    /// Record a processed request
    pub fn record_request(&self, content_type: &str) {
        self.requests.with_label_values(&[content_type]).inc();
    }

    /// Record an endpoint duration
    pub fn observe_duration(&self, endpoint: &str, seconds: f64) {
        self.request_duration
            .with_label_values(&[endpoint])
            .observe(seconds);
    }

    /// Record a routing fallback
    pub fn record_model_fallback(&self) {
        self.model_fallbacks.inc();
    }

    /// Record a store operation; `found` is false for unknown sessions
    pub fn record_session_operation(&self, operation: &str, found: bool) {
        let outcome = if found { "ok" } else { "not_found" };
        self.session_operations
            .with_label_values(&[operation, outcome])
            .inc();
    }

    /// Record an expiry sweep
    pub fn record_sweep(&self, removed: usize, remaining: usize) {
        self.sessions_expired.inc_by(removed as u64);
        self.set_active_sessions(remaining);
    }

    pub fn set_active_sessions(&self, count: usize) {
        self.active_sessions.set(count as i64);
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Helper macro to time operations
#[macro_export]
macro_rules! time_operation {
    ($endpoint:expr, $operation:expr) => {{
        let started = std::time::Instant::now();
        let result = $operation;
        $crate::metrics::METRICS.observe_duration($endpoint, started.elapsed().as_secs_f64());
        result
    }};
}
