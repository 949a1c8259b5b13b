//! Core domain entities of the fee ledger.
//!
//! # Entity Types
//!
//! - [`FeePeriod`] - One semester's billing cycle, keyed by [`PeriodKey`]
//! - [`Log`] - An immutable monetary event of a [`LogKind`]
//! - [`Member`] - A club member as seen by the ledger
//! - [`Principal`] - The authenticated caller
//!
//! Creation inputs use separate structs (`NewFeePeriod`, `NewLog`).

pub mod fee_period;
pub mod log;
pub mod member;
pub mod principal;

pub use fee_period::{FeePeriod, NewFeePeriod, PeriodKey};
pub use log::{Log, LogKind, NewLog};
pub use member::{Attendance, Member};
pub use principal::Principal;
