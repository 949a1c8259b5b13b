//! Read-only access to the membership directory.

use crate::domain::entities::Member;
use crate::error::AppError;
use async_trait::async_trait;

/// Membership directory as consumed by the fee ledger.
///
/// The ledger never mutates members; approval, exit and graduation are owned
/// elsewhere.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Resolves member ids to records, ordered by id. Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] on timeouts, [`AppError::Internal`] otherwise.
    async fn find_by_ids(&self, ids: Vec<String>) -> Result<Vec<Member>, AppError>;

    /// Approved, non-graduated members whose id is not in `excluding`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] on timeouts, [`AppError::Internal`] otherwise.
    async fn find_billable(&self, excluding: Vec<String>) -> Result<Vec<Member>, AppError>;
}
