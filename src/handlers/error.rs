//! Mapping of domain failures onto HTTP responses.

use crate::domain::AttendanceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error payload returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    // ---
    pub error: String,
}

impl AttendanceError {
    /// HTTP status for this failure kind.
    pub fn status(&self) -> StatusCode {
        // ---
        match self {
            AttendanceError::InvalidInput | AttendanceError::InvalidOrExpiredToken => {
                StatusCode::BAD_REQUEST
            }
            AttendanceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AttendanceError::Unauthorized => StatusCode::FORBIDDEN,
            AttendanceError::DuplicateIdentity
            | AttendanceError::AlreadyMarked
            | AttendanceError::SessionClosed => StatusCode::CONFLICT,
            AttendanceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AttendanceError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();

        let error = match &self {
            AttendanceError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn statuses_follow_failure_kind() {
        // ---
        let cases = [
            (AttendanceError::InvalidInput, 400),
            (AttendanceError::InvalidOrExpiredToken, 400),
            (AttendanceError::InvalidCredentials, 401),
            (AttendanceError::Unauthorized, 403),
            (AttendanceError::DuplicateIdentity, 409),
            (AttendanceError::AlreadyMarked, 409),
            (AttendanceError::SessionClosed, 409),
            (AttendanceError::Internal(anyhow::anyhow!("boom")), 500),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status().as_u16(), expected, "{err:?}");
        }
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        // ---
        let response = AttendanceError::Internal(anyhow::anyhow!("db password is hunter2"))
            .into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }
}
