//! Teacher-side handlers: session lifecycle and token rotation.

use crate::app_state::AppState;
use crate::domain::{AttendanceError, AttendanceResult, QrPayload, SessionId};
use crate::handlers::shared_types::{parse_session_id, Caller, MessageResponse};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSessionRequest {
    // ---
    #[serde(flatten)]
    pub caller: Caller,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    // ---
    pub session_id: SessionId,

    /// How long each rotated token stays valid.
    pub token_ttl_ms: i64,

    /// How often the presenting client should rotate.
    pub rotation_interval_ms: i64,
}

/// Body shared by every request that targets an existing session.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionRequest {
    // ---
    #[serde(flatten)]
    pub caller: Caller,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTokenResponse {
    // ---
    pub token: String,
    pub expires_at: DateTime<Utc>,

    /// Ready-to-render QR content, `"<sessionId>:<token>"`.
    pub payload: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /create-session
///
/// Opens a new attendance session owned by the calling teacher.
///
/// # Errors
/// 403 if the caller is not an authenticated teacher.
#[tracing::instrument(skip(state, req))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> AttendanceResult<Json<CreateSessionResponse>> {
    // ---
    let teacher = state
        .identity()
        .authorize(&req.caller.user_id, &req.caller.auth_token)
        .await?;

    let session_id = state.authority().create_session(&teacher, Utc::now()).await?;
    state.metrics().record_session_created();

    let policy = state.authority().policy();

    Ok(Json(CreateSessionResponse {
        session_id,
        token_ttl_ms: policy.token_ttl.num_milliseconds(),
        rotation_interval_ms: policy.rotation_interval.num_milliseconds(),
    }))
}

/// POST /get-new-token
///
/// Rotates the session's token. The previous token stops validating
/// immediately.
///
/// # Errors
/// - 403 if the session is unknown or the caller is not its owner
/// - 409 if the session has been closed
#[tracing::instrument(skip(state, req), fields(session_id = %req.session_id))]
pub async fn get_new_token(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> AttendanceResult<Json<NewTokenResponse>> {
    // ---
    let teacher = state
        .identity()
        .authorize(&req.caller.user_id, &req.caller.auth_token)
        .await?;
    let session_id = parse_session_id(&req.session_id, AttendanceError::Unauthorized)?;

    let issued = state
        .authority()
        .rotate_token(&teacher, session_id, Utc::now())
        .await?;
    state.metrics().record_token_rotated();

    let payload = QrPayload::new(session_id, issued.value.as_str()).to_string();

    Ok(Json(NewTokenResponse {
        token: issued.value,
        expires_at: issued.expires_at,
        payload,
    }))
}

/// POST /close-session
///
/// Deactivates the session; outstanding codes stop validating. Attendance
/// stays readable by the owner.
///
/// # Errors
/// 403 if the session is unknown or the caller is not its owner.
#[tracing::instrument(skip(state, req), fields(session_id = %req.session_id))]
pub async fn close_session(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> AttendanceResult<Json<MessageResponse>> {
    // ---
    let teacher = state
        .identity()
        .authorize(&req.caller.user_id, &req.caller.auth_token)
        .await?;
    let session_id = parse_session_id(&req.session_id, AttendanceError::Unauthorized)?;

    state
        .authority()
        .close_session(&teacher, session_id, Utc::now())
        .await?;

    Ok(Json(MessageResponse {
        message: "Session closed",
    }))
}
