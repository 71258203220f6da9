//! Registration, login and bearer-credential checks.
//!
//! Every other operation is gated on [`Identity::authorize`], which turns a
//! `(userId, authToken)` pair from the wire into a known [`User`].

use uuid::Uuid;

use super::error::{AttendanceError, AttendanceResult};
use super::hasher::CredentialHasherPtr;
use super::models::{constant_time_eq, Role, User, UserId};
use super::repository::RepositoryPtr;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    // ---
    pub user_id: UserId,

    /// Bearer credential for subsequent requests. Replaces any earlier one.
    pub credential: String,

    pub role: Role,
}

/// Identity/Access component.
#[derive(Clone)]
pub struct Identity {
    // ---
    repository: RepositoryPtr,
    hasher: CredentialHasherPtr,
}

impl Identity {
    // ---
    pub fn new(repository: RepositoryPtr, hasher: CredentialHasherPtr) -> Self {
        // ---
        Self { repository, hasher }
    }

    /// Registers a new user with a unique display name.
    ///
    /// # Errors
    /// - `InvalidInput` if a field is empty or `role` is not teacher/student
    /// - `DuplicateIdentity` if the name is taken
    pub async fn register(
        &self,
        username: &str,
        secret: &str,
        role: &str,
    ) -> AttendanceResult<User> {
        // ---
        if username.trim().is_empty() || secret.is_empty() {
            return Err(AttendanceError::InvalidInput);
        }
        let role: Role = role.parse()?;

        // Cheap early exit; `create_user` is still the authority on uniqueness.
        if self.repository.get_user_by_username(username).await?.is_some() {
            return Err(AttendanceError::DuplicateIdentity);
        }

        let secret_hash = self.hasher.hash_secret(secret).await?;
        let user = User::new(username.to_string(), secret_hash, role);

        if !self.repository.create_user(user.clone()).await? {
            return Err(AttendanceError::DuplicateIdentity);
        }

        tracing::info!("Registered {} '{}' ({})", user.role, user.username, user.id);

        Ok(user)
    }

    /// Verifies a name/secret pair and issues a fresh bearer credential.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown name or a wrong secret.
    pub async fn login(&self, username: &str, secret: &str) -> AttendanceResult<LoginGrant> {
        // ---
        let user = self
            .repository
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| {
                // ---
                tracing::warn!("Login attempt for unknown user: {}", username);
                AttendanceError::InvalidCredentials
            })?;

        if !self.hasher.verify_secret(secret, &user.secret_hash).await? {
            tracing::warn!("Wrong secret for user: {}", username);
            return Err(AttendanceError::InvalidCredentials);
        }

        let credential = Uuid::new_v4().to_string();
        self.repository
            .set_bearer(user.id, credential.clone())
            .await?;

        tracing::info!("User '{}' logged in", user.username);

        Ok(LoginGrant {
            user_id: user.id,
            credential,
            role: user.role,
        })
    }

    /// True iff `credential` is the most recently issued one for `user_id`.
    pub async fn authenticate(&self, user_id: UserId, credential: &str) -> AttendanceResult<bool> {
        // ---
        let current = self.repository.get_bearer(user_id).await?;

        Ok(current
            .map(|current| constant_time_eq(current.as_bytes(), credential.as_bytes()))
            .unwrap_or(false))
    }

    /// Resolves the wire-level `(userId, authToken)` pair into a user.
    ///
    /// # Errors
    /// `Unauthorized` if the id is malformed, unknown, or the credential
    /// is not the current one.
    pub async fn authorize(&self, user_id: &str, credential: &str) -> AttendanceResult<User> {
        // ---
        let user_id: UserId = user_id.parse().map_err(|_| {
            // ---
            tracing::debug!("Malformed user id in request");
            AttendanceError::Unauthorized
        })?;

        if !self.authenticate(user_id, credential).await? {
            tracing::debug!("Stale or unknown bearer credential for {}", user_id);
            return Err(AttendanceError::Unauthorized);
        }

        self.repository
            .get_user_by_id(user_id)
            .await?
            .ok_or(AttendanceError::Unauthorized)
    }
}
