//! Domain layer containing the fee ledger's entities and rules.
//!
//! # Architecture
//!
//! - [`entities`] - Periods, logs, members and the authenticated principal
//! - [`repositories`] - Store trait definitions
//! - [`ledger`] - Pure aggregation over a period's logs
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Orchestration lives in services (see [`crate::application::services`])

pub mod entities;
pub mod ledger;
pub mod repositories;
