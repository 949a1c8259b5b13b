//! Utility functions shared by the server and the admin CLI.
//!
//! - [`token`] - API token generation and keyed hashing
//! - [`db_error`] - Database error classification

pub mod db_error;
pub mod token;
