mod argon2_hasher;

pub use argon2_hasher::Argon2Hasher;
use std::sync::Arc;

/// Creates the Argon2id secret hasher with default parameters.
pub fn create() -> crate::domain::CredentialHasherPtr {
    Arc::new(Argon2Hasher::default())
}
