//! In-memory repository.
//!
//! Users and bearer credentials sit behind one `RwLock` each. Sessions are
//! indexed by id, and every session record carries its own `Mutex` so that
//! operations on different sessions never contend.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{Repository, Session, SessionHandle, SessionId, User, UserId};

#[derive(Default)]
struct Users {
    // ---
    by_id: HashMap<UserId, User>,
    id_by_name: HashMap<String, UserId>,
}

/// Process-local storage for users, credentials and sessions.
#[derive(Default)]
pub struct MemoryRepository {
    // ---
    users: RwLock<Users>,
    bearers: RwLock<HashMap<UserId, String>>,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl MemoryRepository {
    // ---
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn create_user(&self, user: User) -> Result<bool> {
        // ---
        let mut users = self.users.write().await;

        if users.id_by_name.contains_key(&user.username) {
            return Ok(false);
        }

        users.id_by_name.insert(user.username.clone(), user.id);
        users.by_id.insert(user.id, user);

        Ok(true)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        // ---
        let users = self.users.read().await;

        Ok(users
            .id_by_name
            .get(username)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn get_user_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        // ---
        Ok(self.users.read().await.by_id.get(&user_id).cloned())
    }

    async fn set_bearer(&self, user_id: UserId, credential: String) -> Result<()> {
        // ---
        self.bearers.write().await.insert(user_id, credential);
        Ok(())
    }

    async fn get_bearer(&self, user_id: UserId) -> Result<Option<String>> {
        // ---
        Ok(self.bearers.read().await.get(&user_id).cloned())
    }

    async fn insert_session(&self, session: Session) -> Result<SessionHandle> {
        // ---
        let session_id = session.id;
        let handle = Arc::new(Mutex::new(session));

        self.sessions
            .write()
            .await
            .insert(session_id, Arc::clone(&handle));

        Ok(handle)
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Option<SessionHandle>> {
        // ---
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn remove_idle_sessions(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        // ---
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        // A session whose lock is held right now is in use, so it stays.
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.last_activity >= cutoff,
            Err(_) => true,
        });

        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::Role;
    use chrono::Duration;

    fn user(name: &str) -> User {
        User::new(name.to_string(), "hash".to_string(), Role::Student)
    }

    #[tokio::test]
    async fn create_and_get_user() -> Result<()> {
        // ---
        let repo = MemoryRepository::new();
        let bilbo = user("Bilbo Baggins");

        assert!(repo.create_user(bilbo.clone()).await?);

        let by_name = repo
            .get_user_by_username("Bilbo Baggins")
            .await?
            .expect("user by name");
        assert_eq!(by_name.id, bilbo.id);

        let by_id = repo.get_user_by_id(bilbo.id).await?.expect("user by id");
        assert_eq!(by_id.username, "Bilbo Baggins");

        assert!(repo.get_user_by_username("Frodo").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn usernames_are_unique() -> Result<()> {
        // ---
        let repo = MemoryRepository::new();

        assert!(repo.create_user(user("Thorin")).await?);
        assert!(!repo.create_user(user("Thorin")).await?);
        Ok(())
    }

    #[tokio::test]
    async fn bearer_is_replaced_not_appended() -> Result<()> {
        // ---
        let repo = MemoryRepository::new();
        let id = user("Balin").id;

        assert!(repo.get_bearer(id).await?.is_none());
        repo.set_bearer(id, "first".into()).await?;
        repo.set_bearer(id, "second".into()).await?;

        assert_eq!(repo.get_bearer(id).await?.as_deref(), Some("second"));
        Ok(())
    }

    #[tokio::test]
    async fn session_handles_share_state() -> Result<()> {
        // ---
        let repo = MemoryRepository::new();
        let now = Utc::now();
        let session = Session::new(user("Gandalf").id, now);
        let session_id = session.id;

        let inserted = repo.insert_session(session).await?;
        inserted.lock().await.close(now);

        let fetched = repo.get_session(session_id).await?.expect("session");
        assert!(!fetched.lock().await.active);
        Ok(())
    }

    #[tokio::test]
    async fn idle_sweep_keeps_locked_and_recent_sessions() -> Result<()> {
        // ---
        let repo = MemoryRepository::new();
        let start = Utc::now();
        let owner = user("Elrond").id;

        let idle = repo.insert_session(Session::new(owner, start)).await?;
        let busy = repo.insert_session(Session::new(owner, start)).await?;
        let recent = repo
            .insert_session(Session::new(owner, start + Duration::hours(1)))
            .await?;

        let idle_id = idle.lock().await.id;
        let busy_id = busy.lock().await.id;
        let recent_id = recent.lock().await.id;

        let _guard = busy.lock().await;
        let removed = repo
            .remove_idle_sessions(start + Duration::minutes(30))
            .await?;

        assert_eq!(removed, 1);
        assert!(repo.get_session(idle_id).await?.is_none());
        assert!(repo.get_session(busy_id).await?.is_some());
        assert!(repo.get_session(recent_id).await?.is_some());
        Ok(())
    }
}
