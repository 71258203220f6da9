use metrics::{counter, histogram};
use std::time::Instant;

pub fn increment_users_registered() {
    counter!("users_registered_total").increment(1);
}

pub fn increment_sessions_created() {
    counter!("sessions_created_total").increment(1);
}

pub fn increment_tokens_rotated() {
    counter!("tokens_rotated_total").increment(1);
}

pub fn increment_attendance_marked() {
    counter!("attendance_marked_total").increment(1);
}

/// Count a refused attendance attempt, labelled by reason.
pub fn increment_attendance_rejected(reason: &'static str) {
    counter!("attendance_rejected_total", "reason" => reason).increment(1);
}

pub fn increment_sessions_swept(count: usize) {
    counter!("sessions_swept_total").increment(count as u64);
}

/// Track HTTP request latency using a histogram.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "http_request_duration_seconds",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
}
