//! In-process repository implementations.
//!
//! These hold their state behind a `tokio::sync::RwLock` and mirror the
//! PostgreSQL repositories' guarantees: duplicate periods and duplicate
//! exemptions are rejected under the write lock, and a batch of logs is
//! inserted all or none. Integration tests run the full HTTP stack on them.

pub mod memory_fee_repository;
pub mod memory_member_directory;
pub mod memory_token_repository;

pub use memory_fee_repository::MemoryFeeRepository;
pub use memory_member_directory::MemoryMemberDirectory;
pub use memory_token_repository::MemoryTokenRepository;
