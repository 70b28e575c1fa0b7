//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_repository;
mod in_memory_decision_cache;
mod postgres_access_directory;
mod postgres_access_repository;
mod redis_decision_cache;

pub use in_memory_access_repository::InMemoryAccessRepository;
pub use in_memory_decision_cache::InMemoryDecisionCache;
pub use postgres_access_directory::PostgresAccessDirectory;
pub use postgres_access_repository::PostgresAccessRepository;
pub use redis_decision_cache::RedisDecisionCache;
