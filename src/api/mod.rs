//! HTTP surface of the fee ledger.
//!
//! - [`dto`] - request bodies, query strings and JSON responses
//! - [`handlers`] - one async function per endpoint
//! - [`middleware`] - authentication, rate limiting and request tracing
//! - [`routes`] - the `/api` route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
