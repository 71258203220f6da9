use crate::domain::{AttendanceError, AttendanceResult, SessionId};
use serde::{Deserialize, Serialize};

/// Identity fields carried by every authenticated request body.
///
/// Missing fields deserialize as empty strings so that they fail
/// authentication instead of being rejected by the JSON extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Caller {
    pub user_id: String,
    pub auth_token: String,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Parses a wire session id, mapping a malformed value to `missing`.
///
/// A malformed id can never name an existing session, so it gets the same
/// outcome as an unknown one.
pub fn parse_session_id(raw: &str, missing: AttendanceError) -> AttendanceResult<SessionId> {
    raw.trim().parse().map_err(|_| missing)
}
