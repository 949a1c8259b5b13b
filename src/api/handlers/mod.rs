//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod fees;
pub mod health;
pub mod reports;
pub mod transactions;

pub use fees::{create_period_handler, search_handler};
pub use health::health_handler;
pub use reports::{amount_handler, deptors_handler, payers_handler};
pub use transactions::{deposit_handler, exempt_handler, pay_handler};
