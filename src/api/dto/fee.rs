//! DTOs for fee ledger endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::member::MemberItem;
use crate::application::services::MemberPayment;
use crate::domain::entities::{FeePeriod, Log, LogKind, PeriodKey};
use crate::domain::ledger::{Deptor, PeriodStatement};
use crate::error::AppError;

/// `{year}/{semester}` path segment shared by every period route.
#[derive(Debug, Deserialize, Validate)]
pub struct PeriodPath {
    #[validate(range(min = 1900, max = 9999))]
    pub year: i32,
    #[validate(range(min = 1, max = 2))]
    pub semester: u8,
}

impl PeriodPath {
    /// Validates the segment and converts it into a [`PeriodKey`].
    pub fn into_key(self) -> Result<PeriodKey, AppError> {
        self.validate()?;
        PeriodKey::new(self.year, self.semester)
    }
}

/// Request to open a fee period.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePeriodRequest {
    #[validate(range(min = 1900, max = 9999))]
    pub year: i32,
    #[validate(range(min = 1, max = 2))]
    pub semester: u8,
    /// Due amount per member.
    #[validate(range(min = 0i64, max = 1_000_000_000_000i64))]
    pub amount: i64,
}

/// Query string of the amount endpoint. Defaults to the caller.
#[derive(Debug, Deserialize, Validate)]
pub struct AmountQuery {
    #[validate(length(min = 1, max = 64))]
    pub member_id: Option<String>,
}

/// Batch of member payments.
#[derive(Debug, Deserialize, Validate)]
pub struct PayRequest {
    #[validate(length(min = 1, max = 500))]
    #[validate(nested)]
    pub payments: Vec<PaymentItem>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PaymentItem {
    #[validate(length(min = 1, max = 64))]
    pub member_id: String,
    #[validate(range(min = 0i64, max = 1_000_000_000_000i64))]
    pub amount: i64,
}

impl From<PaymentItem> for MemberPayment {
    fn from(item: PaymentItem) -> Self {
        MemberPayment {
            member_id: item.member_id,
            amount: item.amount,
        }
    }
}

/// Club-level deposit. Negative amounts record an expense.
#[derive(Debug, Deserialize, Validate)]
pub struct DepositRequest {
    pub amount: i64,
    #[validate(length(min = 1, max = 200))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExemptRequest {
    #[validate(length(min = 1, max = 64))]
    pub member_id: String,
}

#[derive(Debug, Serialize)]
pub struct PeriodResponse {
    pub id: i64,
    pub year: i32,
    pub semester: u8,
    pub amount: i64,
    pub carry_over: i64,
    pub log_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<FeePeriod> for PeriodResponse {
    fn from(period: FeePeriod) -> Self {
        Self {
            id: period.id,
            year: period.year,
            semester: period.semester,
            amount: period.amount,
            carry_over: period.carry_over,
            log_ids: period.log_ids,
            created_at: period.created_at,
        }
    }
}

/// Log entry as shown in the public period statement. Owners are not exposed.
#[derive(Debug, Serialize)]
pub struct PublicLogItem {
    pub description: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub created_at: DateTime<Utc>,
}

impl From<Log> for PublicLogItem {
    fn from(log: Log) -> Self {
        Self {
            description: log.description,
            amount: log.amount,
            kind: log.kind,
            created_at: log.created_at,
        }
    }
}

/// Full log entry returned to fee managers after a write.
#[derive(Debug, Serialize)]
pub struct LogItem {
    pub id: i64,
    pub member_id: Option<String>,
    pub description: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub created_at: DateTime<Utc>,
}

impl From<Log> for LogItem {
    fn from(log: Log) -> Self {
        Self {
            id: log.id,
            member_id: log.member_id,
            description: log.description,
            amount: log.amount,
            kind: log.kind,
            created_at: log.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub carry_over: i64,
    pub logs: Vec<PublicLogItem>,
    pub total: i64,
}

impl From<PeriodStatement> for SearchResponse {
    fn from(statement: PeriodStatement) -> Self {
        Self {
            carry_over: statement.carry_over,
            logs: statement.logs.into_iter().map(PublicLogItem::from).collect(),
            total: statement.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AmountResponse {
    pub member_id: String,
    pub sum: i64,
}

#[derive(Debug, Serialize)]
pub struct PayersResponse {
    pub payers: Vec<MemberItem>,
}

/// A deptor: the member's fields plus the amount still owed.
#[derive(Debug, Serialize)]
pub struct DeptorItem {
    #[serde(flatten)]
    pub member: MemberItem,
    pub dept: i64,
}

impl From<Deptor> for DeptorItem {
    fn from(deptor: Deptor) -> Self {
        Self {
            member: deptor.member.into(),
            dept: deptor.owed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeptorsResponse {
    pub deptors: Vec<DeptorItem>,
}

/// Logs recorded by a write operation.
#[derive(Debug, Serialize)]
pub struct RecordedLogsResponse {
    pub logs: Vec<LogItem>,
}

impl From<Vec<Log>> for RecordedLogsResponse {
    fn from(logs: Vec<Log>) -> Self {
        Self {
            logs: logs.into_iter().map(LogItem::from).collect(),
        }
    }
}
