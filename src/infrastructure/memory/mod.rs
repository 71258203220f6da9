mod memory_repository;

pub use memory_repository::MemoryRepository;
use std::sync::Arc;

/// Creates an empty in-memory repository.
///
/// All state lives for as long as the returned pointer does; nothing is
/// persisted across restarts.
pub fn create() -> crate::domain::RepositoryPtr {
    Arc::new(MemoryRepository::new())
}
