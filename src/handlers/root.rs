use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"QR Attendance API
Version: {version}

Available endpoints:
  - POST /register         - Create a teacher or student account
  - POST /login            - Obtain a bearer credential (authToken)
  - POST /create-session   - Teacher: open an attendance session
  - POST /get-new-token    - Teacher: rotate the session's QR token
  - POST /close-session    - Teacher: stop accepting scans
  - POST /get-attendance   - Teacher: list students marked present
  - POST /mark-attendance  - Student: submit sessionId + token
  - POST /scan             - Student: submit the scanned "<sessionId>:<token>" payload
  - GET  /health           - Light health check
  - GET  /metrics          - Prometheus metrics
"#
    )
}
