use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::{AttendanceError, AttendanceResult};

/// Identity reference for a registered user.
pub type UserId = Uuid;

/// Identifier of a teacher-owned attendance session.
pub type SessionId = Uuid;

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    // ---
    Teacher,
    Student,
}

impl Role {
    // ---
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            _ => Err(AttendanceError::InvalidInput),
        }
    }
}

/// A registered user. Immutable after registration.
#[derive(Debug, Clone)]
pub struct User {
    // ---
    pub id: UserId,

    /// Unique across the whole system.
    pub username: String,

    /// Argon2 PHC string; never the raw secret.
    pub secret_hash: String,

    pub role: Role,
}

impl User {
    // ---
    pub fn new(username: String, secret_hash: String, role: Role) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            username,
            secret_hash,
            role,
        }
    }
}

/// A freshly minted rotating token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    // ---
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Live state of one attendance session.
///
/// Every mutation goes through the session's own lock in the repository,
/// so the methods here assume exclusive access.
#[derive(Debug, Clone)]
pub struct Session {
    // ---
    pub id: SessionId,
    pub teacher_id: UserId,
    pub active: bool,
    current_token: Option<String>,
    token_expires_at: Option<DateTime<Utc>>,
    attendance: HashSet<UserId>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    // ---
    pub fn new(teacher_id: UserId, now: DateTime<Utc>) -> Self {
        // ---
        Self {
            id: Uuid::new_v4(),
            teacher_id,
            active: true,
            current_token: None,
            token_expires_at: None,
            attendance: HashSet::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.teacher_id == user_id
    }

    /// Replaces the current token with a fresh one valid for `ttl`.
    ///
    /// The previous value stops matching immediately, regardless of its
    /// own expiration. Fails without touching the session if `now + ttl`
    /// is not a representable instant.
    pub fn rotate(&mut self, ttl: Duration, now: DateTime<Utc>) -> AttendanceResult<IssuedToken> {
        // ---
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| anyhow::anyhow!("token expiry out of range (ttl {ttl})"))?;
        let value = Uuid::new_v4().to_string();

        self.current_token = Some(value.clone());
        self.token_expires_at = Some(expires_at);
        self.last_activity = now;

        Ok(IssuedToken { value, expires_at })
    }

    /// True iff the session is active, `token` is the current one, and
    /// `now` is strictly before its expiration.
    pub fn accepts(&self, token: &str, now: DateTime<Utc>) -> bool {
        // ---
        if !self.active {
            return false;
        }

        match (&self.current_token, self.token_expires_at) {
            (Some(current), Some(expires_at)) => {
                constant_time_eq(current.as_bytes(), token.as_bytes()) && now < expires_at
            }
            _ => false,
        }
    }

    pub fn has_attended(&self, student_id: UserId) -> bool {
        self.attendance.contains(&student_id)
    }

    /// Adds a student to the attendance set. Returns `false` if present.
    pub fn record(&mut self, student_id: UserId, now: DateTime<Utc>) -> bool {
        // ---
        self.last_activity = now;
        self.attendance.insert(student_id)
    }

    pub fn attendees(&self) -> Vec<UserId> {
        self.attendance.iter().copied().collect()
    }

    /// Deactivates the session and drops its current token.
    pub fn close(&mut self, now: DateTime<Utc>) {
        // ---
        self.active = false;
        self.current_token = None;
        self.token_expires_at = None;
        self.last_activity = now;
    }
}

/// Compares two byte strings without short-circuiting on the first mismatch.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    // ---
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
