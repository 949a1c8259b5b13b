//! Repository trait for fee periods and their logs.

use crate::domain::entities::{FeePeriod, Log, LogKind, NewFeePeriod, NewLog, PeriodKey};
use crate::error::AppError;
use async_trait::async_trait;

/// Narrows [`FeeRepository::find_logs`] to some kinds and, optionally, some members.
#[derive(Debug, Clone, PartialEq)]
pub struct LogFilter {
    pub kinds: Vec<LogKind>,
    /// `None` matches logs of every owner, including unowned deposits.
    pub member_ids: Option<Vec<String>>,
}

impl LogFilter {
    /// Every log of the period.
    pub fn all() -> Self {
        Self {
            kinds: vec![LogKind::Payment, LogKind::Deposit, LogKind::Exemption],
            member_ids: None,
        }
    }

    pub fn kinds(kinds: &[LogKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            member_ids: None,
        }
    }

    pub fn for_member(mut self, member_id: impl Into<String>) -> Self {
        self.member_ids = Some(vec![member_id.into()]);
        self
    }

    /// Whether a log passes the filter.
    pub fn matches(&self, log: &Log) -> bool {
        if !self.kinds.contains(&log.kind) {
            return false;
        }
        match (&self.member_ids, &log.member_id) {
            (None, _) => true,
            (Some(ids), Some(member_id)) => ids.contains(member_id),
            (Some(_), None) => false,
        }
    }
}

/// Repository interface for the fee period store and the log store.
///
/// Logs are linked to exactly one period at insert time and are never updated
/// or deleted afterwards.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgFeeRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryFeeRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeeRepository: Send + Sync {
    /// Round trip to the store, used by the health endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] when the store cannot be reached.
    async fn ping(&self) -> Result<(), AppError>;

    /// Persists a new period with an empty log set.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicatePeriod`] if the year and semester are taken,
    /// including when a concurrent create wins the race.
    async fn create_period(&self, new_period: NewFeePeriod) -> Result<FeePeriod, AppError>;

    /// Finds a period by its key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(FeePeriod))` with its log ids if found
    /// - `Ok(None)` if the period was never opened
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] on timeouts, [`AppError::Internal`] otherwise.
    async fn find_period(&self, key: PeriodKey) -> Result<Option<FeePeriod>, AppError>;

    /// Loads the period's logs that pass `filter`, oldest first.
    ///
    /// A missing period yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] on timeouts, [`AppError::Internal`] otherwise.
    async fn find_logs(&self, key: PeriodKey, filter: LogFilter) -> Result<Vec<Log>, AppError>;

    /// Inserts logs and links them to the period atomically: all or none.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the period does not exist
    /// - [`AppError::AlreadyExempted`] if an exemption would duplicate an existing one
    /// - [`AppError::Unavailable`] on timeouts
    async fn append_logs(&self, key: PeriodKey, logs: Vec<NewLog>) -> Result<Vec<Log>, AppError>;
}
