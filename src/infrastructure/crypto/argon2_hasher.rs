//! Argon2id hashing of user secrets.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use crate::domain::CredentialHasher;

/// Salted one-way hasher producing PHC strings (`$argon2id$...`).
#[derive(Default, Clone)]
pub struct Argon2Hasher {
    // ---
    hasher: Argon2<'static>,
}

#[async_trait::async_trait]
impl CredentialHasher for Argon2Hasher {
    // ---
    async fn hash_secret(&self, secret: &str) -> Result<String> {
        // ---
        let secret = secret.to_owned();
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            hasher
                .hash_password(secret.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| anyhow!("failed to hash secret: {e}"))
        })
        .await
        .context("secret hashing task failed")?
    }

    async fn verify_secret(&self, secret: &str, hashed: &str) -> Result<bool> {
        // ---
        let secret = secret.to_owned();
        let hashed = hashed.to_owned();
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || {
            let parsed =
                PasswordHash::new(&hashed).map_err(|e| anyhow!("malformed secret hash: {e}"))?;
            Ok(hasher.verify_password(secret.as_bytes(), &parsed).is_ok())
        })
        .await
        .context("secret verification task failed")?
    }
}
