//! Student submissions and the teacher's attendance view.

use crate::app_state::AppState;
use crate::domain::{AttendanceError, AttendanceResult, QrPayload, SessionId, User, UserId};
use crate::handlers::sessions::SessionRequest;
use crate::handlers::shared_types::{parse_session_id, Caller, MessageResponse};
use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkAttendanceRequest {
    // ---
    #[serde(flatten)]
    pub caller: Caller,
    pub session_id: String,
    pub token: String,
}

/// Submission of the raw string decoded from a QR code.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScanRequest {
    // ---
    #[serde(flatten)]
    pub caller: Caller,
    pub payload: String,
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    // ---
    pub attendance: Vec<UserId>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Authenticates the caller and applies the student role gate.
///
/// Runs before any session input is parsed, so a non-student always gets
/// `Unauthorized` regardless of what else the body holds.
async fn authorize_student(state: &AppState, caller: &Caller) -> AttendanceResult<User> {
    // ---
    let student = state
        .identity()
        .authorize(&caller.user_id, &caller.auth_token)
        .await?;

    if let Err(err) = state.ledger().ensure_can_mark(&student) {
        if let Some(reason) = rejection_reason(&err) {
            state.metrics().record_attendance_rejected(reason);
        }
        return Err(err);
    }

    Ok(student)
}

/// Runs the ledger and keeps the accepted/rejected counters in step.
async fn record_presence(
    state: &AppState,
    student: &User,
    session_id: SessionId,
    token: &str,
) -> AttendanceResult<Json<MessageResponse>> {
    // ---
    let outcome = state
        .ledger()
        .mark_attendance(student, session_id, token, Utc::now())
        .await;

    match outcome {
        Ok(()) => {
            state.metrics().record_attendance_marked();
            Ok(Json(MessageResponse {
                message: "Attendance marked",
            }))
        }
        Err(err) => {
            if let Some(reason) = rejection_reason(&err) {
                state.metrics().record_attendance_rejected(reason);
            }
            Err(err)
        }
    }
}

fn rejection_reason(err: &AttendanceError) -> Option<&'static str> {
    // ---
    match err {
        AttendanceError::InvalidOrExpiredToken => Some("invalid_or_expired_token"),
        AttendanceError::AlreadyMarked => Some("already_marked"),
        AttendanceError::Unauthorized => Some("unauthorized"),
        _ => None,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /mark-attendance
///
/// # Errors
/// - 403 if the caller is not an authenticated student
/// - 400 if the token is not the session's current one or has expired
/// - 409 if the student was already marked present
#[tracing::instrument(skip(state, req), fields(session_id = %req.session_id))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    Json(req): Json<MarkAttendanceRequest>,
) -> AttendanceResult<Json<MessageResponse>> {
    // ---
    let student = authorize_student(&state, &req.caller).await?;
    let session_id = parse_session_id(&req.session_id, AttendanceError::InvalidOrExpiredToken)?;

    record_presence(&state, &student, session_id, &req.token).await
}

/// POST /scan
///
/// Same as `/mark-attendance`, but takes the QR content verbatim.
///
/// # Errors
/// As `/mark-attendance`, plus 400 for a malformed payload.
#[tracing::instrument(skip(state, req))]
pub async fn scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> AttendanceResult<Json<MessageResponse>> {
    // ---
    let student = authorize_student(&state, &req.caller).await?;
    let payload: QrPayload = req.payload.parse()?;

    record_presence(&state, &student, payload.session_id, &payload.token).await
}

/// POST /get-attendance
///
/// Lists the students marked present. Order is unspecified.
///
/// # Errors
/// 403 if the session is unknown or the caller is not its owner.
#[tracing::instrument(skip(state, req), fields(session_id = %req.session_id))]
pub async fn get_attendance(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> AttendanceResult<Json<AttendanceResponse>> {
    // ---
    let teacher = state
        .identity()
        .authorize(&req.caller.user_id, &req.caller.auth_token)
        .await?;
    let session_id = parse_session_id(&req.session_id, AttendanceError::Unauthorized)?;

    let attendance = state.ledger().get_attendance(&teacher, session_id).await?;

    Ok(Json(AttendanceResponse { attendance }))
}
