//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the stores the ledger reads and writes. Concrete
//! implementations live in the infrastructure layer.
//!
//! # Available Repositories
//!
//! - [`FeeRepository`] - Fee periods and their immutable logs
//! - [`MemberDirectory`] - Read-only membership directory
//! - [`TokenRepository`] - API token authentication
//!
//! # Testing
//!
//! Mock implementations are generated via `mockall` under `cfg(test)`.
//! PostgreSQL behaviour is covered in `tests/repository_*.rs`.

pub mod fee_repository;
pub mod member_directory;
pub mod token_repository;

pub use fee_repository::{FeeRepository, LogFilter};
pub use member_directory::MemberDirectory;
pub use token_repository::{ApiToken, NewApiToken, TokenRepository};

#[cfg(test)]
pub use fee_repository::MockFeeRepository;
#[cfg(test)]
pub use member_directory::MockMemberDirectory;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
