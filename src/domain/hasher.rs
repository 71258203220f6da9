use anyhow::Result;
use std::sync::Arc;

/// One-way, salted hashing of user secrets.
#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    // ---
    /// Produce a self-describing hash string for `secret`.
    async fn hash_secret(&self, secret: &str) -> Result<String>;

    /// Check `secret` against a hash produced by [`hash_secret`](Self::hash_secret).
    ///
    /// A malformed `hashed` value is an error, a mismatch is `Ok(false)`.
    async fn verify_secret(&self, secret: &str, hashed: &str) -> Result<bool>;
}

/// Type alias for any backend that implements CredentialHasher.
pub type CredentialHasherPtr = Arc<dyn CredentialHasher>;
