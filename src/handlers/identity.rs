//! Registration and login handlers.

use crate::app_state::AppState;
use crate::domain::{AttendanceResult, Role, UserId};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    // ---
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    // ---
    pub message: &'static str,
    pub user_id: UserId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    // ---
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    // ---
    pub message: &'static str,
    pub user_id: UserId,
    pub auth_token: String,
    pub role: Role,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /register
///
/// Creates a teacher or student account.
///
/// # Errors
/// - 400 if a field is empty or the role is unknown
/// - 409 if the username is taken
#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AttendanceResult<Json<RegisterResponse>> {
    // ---
    let user = state
        .identity()
        .register(&req.username, &req.password, &req.role)
        .await?;

    state.metrics().record_user_registered();

    Ok(Json(RegisterResponse {
        message: "Registered successfully",
        user_id: user.id,
    }))
}

/// POST /login
///
/// Returns a bearer credential (`authToken`) that replaces any earlier one.
///
/// # Errors
/// 401 on unknown username or wrong password.
#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AttendanceResult<Json<LoginResponse>> {
    // ---
    let grant = state.identity().login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse {
        message: "Logged in",
        user_id: grant.user_id,
        auth_token: grant.credential,
        role: grant.role,
    }))
}
