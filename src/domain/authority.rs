//! Session lifecycle and the rotating-token protocol.
//!
//! A presenting client calls [`SessionAuthority::rotate_token`] on a fixed
//! cadence shorter than the token lifetime, so consecutive tokens overlap.
//! That overlap is the grace window for display/scan skew. Rotation still
//! invalidates the previous value at once: at most one token matches.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::OwnedMutexGuard;

use super::error::{AttendanceError, AttendanceResult};
use super::models::{IssuedToken, Role, Session, SessionId, User};
use super::repository::RepositoryPtr;

/// Timing policy for rotating tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    // ---
    /// How long a freshly rotated token stays valid.
    pub token_ttl: Duration,

    /// Cadence at which presenting clients are expected to rotate.
    pub rotation_interval: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        // ---
        Self {
            token_ttl: Duration::seconds(5),
            rotation_interval: Duration::seconds(2),
        }
    }
}

/// Session/Token Authority component.
#[derive(Clone)]
pub struct SessionAuthority {
    // ---
    repository: RepositoryPtr,
    policy: TokenPolicy,
}

impl SessionAuthority {
    // ---
    pub fn new(repository: RepositoryPtr, policy: TokenPolicy) -> Self {
        // ---
        Self { repository, policy }
    }

    pub fn policy(&self) -> TokenPolicy {
        self.policy
    }

    /// Opens a new, active session owned by `requester`.
    ///
    /// # Errors
    /// `Unauthorized` unless the requester is a teacher.
    pub async fn create_session(
        &self,
        requester: &User,
        now: DateTime<Utc>,
    ) -> AttendanceResult<SessionId> {
        // ---
        if requester.role != Role::Teacher {
            tracing::warn!("Non-teacher '{}' tried to create a session", requester.username);
            return Err(AttendanceError::Unauthorized);
        }

        let session = Session::new(requester.id, now);
        let session_id = session.id;
        self.repository.insert_session(session).await?;

        tracing::info!("Teacher '{}' opened session {}", requester.username, session_id);

        Ok(session_id)
    }

    /// Mints a fresh token for `session_id`, replacing the current one.
    ///
    /// # Errors
    /// - `Unauthorized` if the session is unknown or not owned by the requester
    /// - `SessionClosed` if the session has been closed
    pub async fn rotate_token(
        &self,
        requester: &User,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> AttendanceResult<IssuedToken> {
        // ---
        let mut session = self.owned_session(requester, session_id).await?;

        if !session.active {
            return Err(AttendanceError::SessionClosed);
        }

        let issued = session.rotate(self.policy.token_ttl, now)?;
        tracing::debug!("Rotated token for session {}", session_id);

        Ok(issued)
    }

    /// Pure check: session exists, is active, `token` is current and
    /// `now` is strictly before its expiration.
    pub async fn validate_token(
        &self,
        session_id: SessionId,
        token: &str,
        now: DateTime<Utc>,
    ) -> AttendanceResult<bool> {
        // ---
        match self.repository.get_session(session_id).await? {
            Some(handle) => Ok(handle.lock().await.accepts(token, now)),
            None => Ok(false),
        }
    }

    /// Deactivates a session and discards its current token.
    ///
    /// Closing an already closed session succeeds.
    ///
    /// # Errors
    /// `Unauthorized` if the session is unknown or not owned by the requester.
    pub async fn close_session(
        &self,
        requester: &User,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> AttendanceResult<()> {
        // ---
        let mut session = self.owned_session(requester, session_id).await?;

        if session.active {
            session.close(now);
            tracing::info!(
                "Session {} closed after {} min with {} attendee(s)",
                session_id,
                now.signed_duration_since(session.created_at).num_minutes(),
                session.attendees().len()
            );
        }

        Ok(())
    }

    /// Removes sessions idle for longer than `idle_ttl`.
    ///
    /// # Errors
    /// `Internal` if `now - idle_ttl` is not a representable instant.
    pub async fn sweep_idle(&self, idle_ttl: Duration, now: DateTime<Utc>) -> AttendanceResult<usize> {
        // ---
        let cutoff = now
            .checked_sub_signed(idle_ttl)
            .ok_or_else(|| anyhow::anyhow!("idle cutoff out of range (idle ttl {idle_ttl})"))?;

        let removed = self.repository.remove_idle_sessions(cutoff).await?;
        if removed > 0 {
            tracing::info!("Swept {} idle session(s)", removed);
        }

        Ok(removed)
    }

    /// Locks `session_id` for the requester, who must be its owner.
    ///
    /// An unknown session and a foreign one are both `Unauthorized`.
    async fn owned_session(
        &self,
        requester: &User,
        session_id: SessionId,
    ) -> AttendanceResult<OwnedMutexGuard<Session>> {
        // ---
        let Some(handle) = self.repository.get_session(session_id).await? else {
            tracing::warn!(
                "User '{}' referenced unknown session {}",
                requester.username,
                session_id
            );
            return Err(AttendanceError::Unauthorized);
        };

        let session = handle.lock_owned().await;
        if !session.is_owned_by(requester.id) {
            tracing::warn!(
                "User '{}' is not the owner of session {}",
                requester.username,
                session_id
            );
            return Err(AttendanceError::Unauthorized);
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::infrastructure::create_memory_repository;
    use anyhow::Result;
    use uuid::Uuid;

    fn user(name: &str, role: Role) -> User {
        User::new(name.to_string(), "unused".to_string(), role)
    }

    fn authority() -> SessionAuthority {
        SessionAuthority::new(create_memory_repository(), TokenPolicy::default())
    }

    #[tokio::test]
    async fn only_teachers_create_sessions() -> Result<()> {
        // ---
        let authority = authority();
        let now = Utc::now();

        let result = authority
            .create_session(&user("bob", Role::Student), now)
            .await;
        assert!(matches!(result, Err(AttendanceError::Unauthorized)));

        authority
            .create_session(&user("alice", Role::Teacher), now)
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn rotate_then_validate_round_trip() -> Result<()> {
        // ---
        let authority = authority();
        let alice = user("alice", Role::Teacher);
        let now = Utc::now();

        let session_id = authority.create_session(&alice, now).await?;
        let issued = authority.rotate_token(&alice, session_id, now).await?;

        assert_eq!(issued.expires_at, now + Duration::seconds(5));
        assert!(
            authority
                .validate_token(session_id, &issued.value, now + Duration::seconds(1))
                .await?
        );
        assert!(
            !authority
                .validate_token(session_id, &issued.value, issued.expires_at)
                .await?
        );
        Ok(())
    }

    #[tokio::test]
    async fn validate_is_false_for_unknown_sessions_and_tokens() -> Result<()> {
        // ---
        let authority = authority();
        let alice = user("alice", Role::Teacher);
        let now = Utc::now();

        let session_id = authority.create_session(&alice, now).await?;
        assert!(!authority.validate_token(session_id, "", now).await?);

        authority.rotate_token(&alice, session_id, now).await?;
        assert!(!authority.validate_token(session_id, "guess", now).await?);
        assert!(!authority.validate_token(Uuid::new_v4(), "guess", now).await?);
        Ok(())
    }

    #[tokio::test]
    async fn rotation_supersedes_earlier_token() -> Result<()> {
        // ---
        let authority = authority();
        let alice = user("alice", Role::Teacher);
        let now = Utc::now();

        let session_id = authority.create_session(&alice, now).await?;
        let first = authority.rotate_token(&alice, session_id, now).await?;
        let second = authority
            .rotate_token(&alice, session_id, now + Duration::seconds(2))
            .await?;

        let probe = now + Duration::seconds(3);
        assert!(!authority.validate_token(session_id, &first.value, probe).await?);
        assert!(authority.validate_token(session_id, &second.value, probe).await?);
        Ok(())
    }

    #[tokio::test]
    async fn only_owner_rotates_or_closes() -> Result<()> {
        // ---
        let authority = authority();
        let alice = user("alice", Role::Teacher);
        let carol = user("carol", Role::Teacher);
        let now = Utc::now();

        let session_id = authority.create_session(&alice, now).await?;

        assert!(matches!(
            authority.rotate_token(&carol, session_id, now).await,
            Err(AttendanceError::Unauthorized)
        ));
        assert!(matches!(
            authority.close_session(&carol, session_id, now).await,
            Err(AttendanceError::Unauthorized)
        ));
        assert!(matches!(
            authority.rotate_token(&alice, Uuid::new_v4(), now).await,
            Err(AttendanceError::Unauthorized)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn closed_session_stops_validating_and_rotating() -> Result<()> {
        // ---
        let authority = authority();
        let alice = user("alice", Role::Teacher);
        let now = Utc::now();

        let session_id = authority.create_session(&alice, now).await?;
        let issued = authority.rotate_token(&alice, session_id, now).await?;

        authority.close_session(&alice, session_id, now).await?;
        authority.close_session(&alice, session_id, now).await?;

        assert!(!authority.validate_token(session_id, &issued.value, now).await?);
        assert!(matches!(
            authority.rotate_token(&alice, session_id, now).await,
            Err(AttendanceError::SessionClosed)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_durations_are_internal_errors() -> Result<()> {
        // ---
        let huge = Duration::days(365 * 1_000_000);
        let alice = user("alice", Role::Teacher);
        let now = Utc::now();

        let authority = SessionAuthority::new(
            create_memory_repository(),
            TokenPolicy {
                token_ttl: huge,
                rotation_interval: Duration::seconds(2),
            },
        );
        let session_id = authority.create_session(&alice, now).await?;

        assert!(matches!(
            authority.rotate_token(&alice, session_id, now).await,
            Err(AttendanceError::Internal(_))
        ));
        assert!(matches!(
            authority.sweep_idle(huge, now).await,
            Err(AttendanceError::Internal(_))
        ));

        // The failed rotation left the session usable.
        authority.close_session(&alice, session_id, now).await?;
        Ok(())
    }

    #[tokio::test]
    async fn sweep_drops_only_idle_sessions() -> Result<()> {
        // ---
        let authority = authority();
        let alice = user("alice", Role::Teacher);
        let start = Utc::now();

        let stale = authority.create_session(&alice, start).await?;
        let fresh = authority
            .create_session(&alice, start + Duration::hours(2))
            .await?;

        let removed = authority
            .sweep_idle(Duration::hours(1), start + Duration::minutes(150))
            .await?;
        assert_eq!(removed, 1);

        assert!(matches!(
            authority.rotate_token(&alice, stale, start).await,
            Err(AttendanceError::Unauthorized)
        ));
        authority.rotate_token(&alice, fresh, start).await?;
        Ok(())
    }
}
