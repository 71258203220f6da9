//! Per-session attendance sets, gated by a valid rotating token.

use chrono::{DateTime, Utc};

use super::error::{AttendanceError, AttendanceResult};
use super::models::{Role, SessionId, User, UserId};
use super::repository::RepositoryPtr;

/// Attendance Ledger component.
#[derive(Clone)]
pub struct AttendanceLedger {
    // ---
    repository: RepositoryPtr,
}

impl AttendanceLedger {
    // ---
    pub fn new(repository: RepositoryPtr) -> Self {
        Self { repository }
    }

    /// Role gate for marking attendance. Checked before anything about the
    /// target session, so callers can run it ahead of parsing session input.
    ///
    /// # Errors
    /// `Unauthorized` unless the requester is a student.
    pub fn ensure_can_mark(&self, requester: &User) -> AttendanceResult<()> {
        // ---
        if requester.role != Role::Student {
            tracing::warn!("Non-student '{}' tried to mark attendance", requester.username);
            return Err(AttendanceError::Unauthorized);
        }
        Ok(())
    }

    /// Records `requester` as present in `session_id`.
    ///
    /// Token validation and insertion happen under one lock on the
    /// session, so a concurrent rotation is either fully before or fully
    /// after this call.
    ///
    /// # Errors
    /// - `Unauthorized` unless the requester is a student
    /// - `InvalidOrExpiredToken` if the session is unknown, closed, or the
    ///   token is not current at `now`
    /// - `AlreadyMarked` if the student is already in the set
    pub async fn mark_attendance(
        &self,
        requester: &User,
        session_id: SessionId,
        token: &str,
        now: DateTime<Utc>,
    ) -> AttendanceResult<()> {
        // ---
        self.ensure_can_mark(requester)?;

        let handle = self
            .repository
            .get_session(session_id)
            .await?
            .ok_or(AttendanceError::InvalidOrExpiredToken)?;
        let mut session = handle.lock().await;

        if !session.accepts(token, now) {
            tracing::debug!(
                "Rejected token from '{}' for session {}",
                requester.username,
                session_id
            );
            return Err(AttendanceError::InvalidOrExpiredToken);
        }

        if session.has_attended(requester.id) {
            return Err(AttendanceError::AlreadyMarked);
        }
        session.record(requester.id, now);

        tracing::info!(
            "Student '{}' marked present in session {}",
            requester.username,
            session_id
        );

        Ok(())
    }

    /// Current attendance set of a session. Order is unspecified.
    ///
    /// # Errors
    /// `Unauthorized` if the session is unknown or not owned by the requester.
    pub async fn get_attendance(
        &self,
        requester: &User,
        session_id: SessionId,
    ) -> AttendanceResult<Vec<UserId>> {
        // ---
        let handle = self
            .repository
            .get_session(session_id)
            .await?
            .ok_or(AttendanceError::Unauthorized)?;
        let session = handle.lock().await;

        if !session.is_owned_by(requester.id) {
            tracing::warn!(
                "User '{}' tried to read attendance of session {}",
                requester.username,
                session_id
            );
            return Err(AttendanceError::Unauthorized);
        }

        Ok(session.attendees())
    }
}
