use crate::domain::Metrics;
use std::time::Instant;

/// No-op metrics implementation for testing.
#[derive(Default)]
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn record_user_registered(&self) {}
    fn record_session_created(&self) {}
    fn record_token_rotated(&self) {}
    fn record_attendance_marked(&self) {}
    fn record_attendance_rejected(&self, _: &'static str) {}
    fn record_sessions_swept(&self, _: usize) {}
    fn record_http_request(&self, _: Instant, _: &str, _: &str, _: u16) {}
}
