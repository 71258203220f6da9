use super::models::{Session, SessionId, User, UserId};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A session record behind its own lock.
///
/// Holding the guard serializes token rotation, attendance marking and
/// closing for that one session; other sessions are unaffected.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Abstraction over where users, bearer credentials and sessions live.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Store a new user. Returns `false` if the username is already taken.
    async fn create_user(&self, user: User) -> Result<bool>;

    /// Get user by username.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by ID.
    async fn get_user_by_id(&self, user_id: UserId) -> Result<Option<User>>;

    /// Replace the bearer credential issued to a user.
    async fn set_bearer(&self, user_id: UserId, credential: String) -> Result<()>;

    /// Most recently issued bearer credential for a user, if any.
    async fn get_bearer(&self, user_id: UserId) -> Result<Option<String>>;

    /// Store a new session and return its lock handle.
    async fn insert_session(&self, session: Session) -> Result<SessionHandle>;

    /// Look up a session's lock handle.
    async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionHandle>>;

    /// Drop every session whose last activity is before `cutoff`.
    ///
    /// Returns how many sessions were removed.
    async fn remove_idle_sessions(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
