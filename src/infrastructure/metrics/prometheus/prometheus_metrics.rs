//! Prometheus metrics implementation.
//!
//! Concrete implementation of the `Metrics` trait on top of the global
//! `metrics` crate registry. Counter and histogram helpers live in
//! `counters.rs`; the single global `PrometheusHandle` lives in
//! `recorder.rs` and renders everything in Prometheus text format.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Empty because all metrics are registered globally through the
/// `counter!()` and `histogram!()` macros.
pub struct PrometheusMetrics {
    // Empty - uses global metrics registry pattern
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_user_registered(&self) {
        super::increment_users_registered();
    }

    fn record_session_created(&self) {
        super::increment_sessions_created();
    }

    fn record_token_rotated(&self) {
        super::increment_tokens_rotated();
    }

    fn record_attendance_marked(&self) {
        super::increment_attendance_marked();
    }

    fn record_attendance_rejected(&self, reason: &'static str) {
        tracing::debug!("Recording rejected attendance: {}", reason);
        super::increment_attendance_rejected(reason);
    }

    fn record_sessions_swept(&self, count: usize) {
        super::increment_sessions_swept(count);
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}
