mod crypto;
mod memory;
pub mod metrics;

// Re-export the factory functions for easy access
pub use crypto::create as create_argon2_hasher;
pub use memory::create as create_memory_repository;
pub use metrics::{create_noop_metrics, create_prom_metrics};
