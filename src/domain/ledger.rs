//! Pure ledger computations over a period's logs.
//!
//! Nothing here touches storage. [`crate::application::services::FeeService`]
//! loads the logs and hands them to these functions, which keeps every report
//! deterministic for a given set of logs.
//!
//! # Credits
//!
//! | Kind        | Period total | Member credit    | Member payments |
//! |-------------|--------------|------------------|-----------------|
//! | `Payment`   | amount       | amount           | amount          |
//! | `Deposit`   | amount       | -                | -               |
//! | `Exemption` | -            | period due       | -               |

use std::collections::BTreeMap;

use serde_json::json;

use crate::domain::entities::{Log, LogKind, Member};
use crate::error::AppError;

/// Largest absolute amount accepted for a single due, payment or deposit.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Cash view of a period: opening balance, cash logs and closing total.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodStatement {
    pub carry_over: i64,
    /// Payment and deposit logs, oldest first.
    pub logs: Vec<Log>,
    pub total: i64,
}

impl PeriodStatement {
    /// Statement of a period that has not been opened.
    pub fn empty() -> Self {
        Self {
            carry_over: 0,
            logs: Vec::new(),
            total: 0,
        }
    }

    /// Builds a statement from any mix of logs, dropping non-cash entries.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the total does not fit in an `i64`.
    pub fn from_logs(
        carry_over: i64,
        logs: impl IntoIterator<Item = Log>,
    ) -> Result<Self, AppError> {
        let mut logs: Vec<Log> = logs.into_iter().filter(|log| log.kind.is_cash()).collect();
        logs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let total = closing_total(carry_over, &logs)?;

        Ok(Self {
            carry_over,
            logs,
            total,
        })
    }
}

/// Validates an amount against [`MAX_AMOUNT`].
///
/// # Errors
///
/// Returns [`AppError::Validation`] when `amount` is out of range.
pub fn check_amount(field: &str, amount: i64) -> Result<(), AppError> {
    if amount.unsigned_abs() > MAX_AMOUNT.unsigned_abs() {
        return Err(AppError::bad_request(
            "Amount out of range",
            json!({ "field": field, "amount": amount, "max": MAX_AMOUNT }),
        ));
    }
    Ok(())
}

fn add(total: i64, amount: i64) -> Result<i64, AppError> {
    total.checked_add(amount).ok_or_else(|| {
        tracing::error!(total, amount, "Ledger sum overflow");
        AppError::internal("Ledger sum out of range", json!({}))
    })
}

/// Carry-over plus the sum of every cash log.
///
/// # Errors
///
/// Returns [`AppError::Internal`] on overflow.
pub fn closing_total(carry_over: i64, logs: &[Log]) -> Result<i64, AppError> {
    logs.iter()
        .filter(|log| log.kind.is_cash())
        .try_fold(carry_over, |total, log| add(total, log.amount))
}

/// Credit per member toward the due amount.
///
/// Payments credit their amount; each exemption credits exactly `due`.
///
/// # Errors
///
/// Returns [`AppError::Internal`] on overflow.
pub fn member_credits(logs: &[Log], due: i64) -> Result<BTreeMap<String, i64>, AppError> {
    let mut credits = BTreeMap::new();
    for log in logs {
        let Some(member_id) = log.member_id.as_ref() else {
            continue;
        };
        let credit = match log.kind {
            LogKind::Payment => log.amount,
            LogKind::Exemption => due,
            LogKind::Deposit => continue,
        };
        let entry = credits.entry(member_id.clone()).or_insert(0);
        *entry = add(*entry, credit)?;
    }
    Ok(credits)
}

/// Sum of payment amounts per member. Exemptions are not payments.
///
/// # Errors
///
/// Returns [`AppError::Internal`] on overflow.
pub fn member_payments(logs: &[Log]) -> Result<BTreeMap<String, i64>, AppError> {
    let mut payments = BTreeMap::new();
    for log in logs {
        match (log.kind, log.member_id.as_ref()) {
            (LogKind::Payment, Some(member_id)) => {
                let entry = payments.entry(member_id.clone()).or_insert(0);
                *entry = add(*entry, log.amount)?;
            }
            (LogKind::Payment, None) | (LogKind::Deposit, _) | (LogKind::Exemption, _) => {}
        }
    }
    Ok(payments)
}

/// Members whose credit reaches the due amount, in id order.
pub fn payer_ids(credits: &BTreeMap<String, i64>, due: i64) -> Vec<String> {
    credits
        .iter()
        .filter(|(_, credit)| **credit >= due)
        .map(|(member_id, _)| member_id.clone())
        .collect()
}

/// Amount still owed. May be negative, no flooring is applied.
pub fn shortfall(due: i64, paid: i64) -> i64 {
    due.saturating_sub(paid)
}

/// A billable member who has not reached the due amount.
#[derive(Debug, Clone, PartialEq)]
pub struct Deptor {
    pub member: Member,
    pub owed: i64,
}
