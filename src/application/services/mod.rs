//! Business logic services for the application layer.

pub mod auth_service;
pub mod fee_service;

pub use auth_service::AuthService;
pub use fee_service::{FeeService, MemberPayment};
