//! Fee log entity: one immutable monetary event inside a period.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

/// Kind of a fee log.
///
/// Every aggregation matches on this enum exhaustively, so adding a kind forces
/// each report to decide how it treats the new entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// A member paying dues.
    Payment,
    /// Club-level income not attributed to any member.
    Deposit,
    /// An administrative waiver for one member.
    Exemption,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogKind::Payment => "payment",
            LogKind::Deposit => "deposit",
            LogKind::Exemption => "exemption",
        }
    }

    /// Whether the entry moves cash and therefore counts toward the period total.
    pub fn is_cash(self) -> bool {
        match self {
            LogKind::Payment | LogKind::Deposit => true,
            LogKind::Exemption => false,
        }
    }

    /// Whether the entry credits its owning member toward the due amount.
    pub fn is_member_credit(self) -> bool {
        match self {
            LogKind::Payment | LogKind::Exemption => true,
            LogKind::Deposit => false,
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(LogKind::Payment),
            "deposit" => Ok(LogKind::Deposit),
            "exemption" => Ok(LogKind::Exemption),
            other => Err(AppError::internal(
                "Unknown log kind in store",
                json!({ "kind": other }),
            )),
        }
    }
}

/// A persisted fee log. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Log {
    pub id: i64,
    /// Owning member, `None` for club-level deposits.
    pub member_id: Option<String>,
    pub description: String,
    pub amount: i64,
    pub kind: LogKind,
    pub created_at: DateTime<Utc>,
}

/// Input data for recording a new log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLog {
    pub member_id: Option<String>,
    pub description: String,
    pub amount: i64,
    pub kind: LogKind,
}

impl NewLog {
    pub fn payment(member_id: impl Into<String>, amount: i64) -> Self {
        Self {
            member_id: Some(member_id.into()),
            description: "Club fee payment".to_string(),
            amount,
            kind: LogKind::Payment,
        }
    }

    pub fn deposit(amount: i64, description: impl Into<String>) -> Self {
        Self {
            member_id: None,
            description: description.into(),
            amount,
            kind: LogKind::Deposit,
        }
    }

    pub fn exemption(member_id: impl Into<String>, amount: i64) -> Self {
        Self {
            member_id: Some(member_id.into()),
            description: "Club fee exemption".to_string(),
            amount,
            kind: LogKind::Exemption,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert!(LogKind::Payment.is_cash());
        assert!(LogKind::Deposit.is_cash());
        assert!(!LogKind::Exemption.is_cash());

        assert!(LogKind::Payment.is_member_credit());
        assert!(LogKind::Exemption.is_member_credit());
        assert!(!LogKind::Deposit.is_member_credit());
    }

    #[test]
    fn test_kind_parses_store_values() {
        for kind in [LogKind::Payment, LogKind::Deposit, LogKind::Exemption] {
            assert_eq!(kind.as_str().parse::<LogKind>().unwrap(), kind);
        }
        assert!("refund".parse::<LogKind>().is_err());
    }

    #[test]
    fn test_deposit_has_no_owner() {
        let log = NewLog::deposit(50_000, "Sponsorship");
        assert!(log.member_id.is_none());
        assert_eq!(log.kind, LogKind::Deposit);

        let log = NewLog::exemption("20181681", 30_000);
        assert_eq!(log.member_id.as_deref(), Some("20181681"));
        assert_eq!(log.amount, 30_000);
    }
}
