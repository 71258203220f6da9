use std::sync::Arc;
use std::time::Instant;

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a successful registration.
    fn record_user_registered(&self);

    /// Record a new attendance session.
    fn record_session_created(&self);

    /// Record a token rotation.
    fn record_token_rotated(&self);

    /// Record a student being added to an attendance set.
    fn record_attendance_marked(&self);

    /// Record a refused attendance attempt, labelled by reason.
    fn record_attendance_rejected(&self, reason: &'static str);

    /// Record idle sessions removed by the sweeper.
    fn record_sessions_swept(&self, count: usize);

    /// Record HTTP request duration and labels.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
