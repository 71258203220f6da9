//! The string encoded into each displayed QR code.
//!
//! Format is `"<sessionId>:<token>"` with no escaping. Both halves are
//! drawn from the hyphenated UUID alphabet, so neither can hold a colon.

use std::fmt;
use std::str::FromStr;

use super::error::AttendanceError;
use super::models::SessionId;

/// A decoded `"<sessionId>:<token>"` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    // ---
    pub session_id: SessionId,
    pub token: String,
}

impl QrPayload {
    // ---
    pub fn new(session_id: SessionId, token: impl Into<String>) -> Self {
        // ---
        Self {
            session_id,
            token: token.into(),
        }
    }
}

impl fmt::Display for QrPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.session_id, self.token)
    }
}

impl FromStr for QrPayload {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        let (session_part, token) = s.trim().split_once(':').ok_or(AttendanceError::InvalidInput)?;

        if token.is_empty() || token.contains(':') {
            return Err(AttendanceError::InvalidInput);
        }

        let session_id = session_part
            .parse::<SessionId>()
            .map_err(|_| AttendanceError::InvalidInput)?;

        Ok(Self::new(session_id, token))
    }
}
