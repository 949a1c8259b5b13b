//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::fee_service::FeeService`] - Fee periods, payments, exemptions and reports
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
