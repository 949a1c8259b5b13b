//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries
//! are bound at runtime and rows decoded through `sqlx::FromRow`.
//!
//! # Repositories
//!
//! - [`PgFeeRepository`] - Fee periods and logs
//! - [`PgMemberDirectory`] - Read-only member lookups
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_fee_repository;
pub mod pg_member_directory;
pub mod pg_token_repository;

pub use pg_fee_repository::PgFeeRepository;
pub use pg_member_directory::PgMemberDirectory;
pub use pg_token_repository::PgTokenRepository;
