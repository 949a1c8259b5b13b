//! Fee ledger service: opening periods, recording logs and reporting.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{FeePeriod, Log, LogKind, Member, NewFeePeriod, NewLog, PeriodKey};
use crate::domain::ledger::{self, Deptor, PeriodStatement};
use crate::domain::repositories::{FeeRepository, LogFilter, MemberDirectory};
use crate::error::AppError;

/// One member's share of a [`FeeService::pay`] batch.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberPayment {
    pub member_id: String,
    pub amount: i64,
}

/// Service coordinating the period store, the log store and the membership
/// directory.
///
/// Reports are computed fresh from the logs on every call, so two reads with
/// no write in between return identical results.
pub struct FeeService<F: FeeRepository + ?Sized, M: MemberDirectory + ?Sized> {
    fee_repository: Arc<F>,
    member_directory: Arc<M>,
    reserved_member_id: String,
}

impl<F: FeeRepository + ?Sized, M: MemberDirectory + ?Sized> FeeService<F, M> {
    /// Creates a new fee service.
    ///
    /// # Arguments
    ///
    /// - `reserved_member_id` - administrative account never listed as a deptor
    pub fn new(
        fee_repository: Arc<F>,
        member_directory: Arc<M>,
        reserved_member_id: impl Into<String>,
    ) -> Self {
        Self {
            fee_repository,
            member_directory,
            reserved_member_id: reserved_member_id.into(),
        }
    }

    /// Store round trip for health checks.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.fee_repository.ping().await
    }

    /// Opens a period, carrying over the predecessor's closing total.
    ///
    /// The predecessor is read through [`Self::search`], so an unopened
    /// predecessor contributes 0. It is never modified.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `amount` is negative or above [`ledger::MAX_AMOUNT`]
    /// - [`AppError::DuplicatePeriod`] if the period already exists
    pub async fn create_period(&self, key: PeriodKey, amount: i64) -> Result<FeePeriod, AppError> {
        if amount < 0 {
            return Err(AppError::bad_request(
                "Due amount must not be negative",
                json!({ "amount": amount }),
            ));
        }
        ledger::check_amount("amount", amount)?;

        if self.fee_repository.find_period(key).await?.is_some() {
            tracing::warn!(year = key.year, semester = key.semester, "Fee period already exists");
            return Err(AppError::DuplicatePeriod {
                year: key.year,
                semester: key.semester,
            });
        }

        let carry_over = self.search(key.previous()).await?.total;

        let period = self
            .fee_repository
            .create_period(NewFeePeriod {
                key,
                amount,
                carry_over,
            })
            .await?;

        metrics::counter!("fee_periods_created_total").increment(1);
        tracing::info!(
            year = key.year,
            semester = key.semester,
            amount,
            carry_over,
            "Fee period opened"
        );

        Ok(period)
    }

    /// Cash statement of a period.
    ///
    /// A period that was never opened yields [`PeriodStatement::empty`].
    pub async fn search(&self, key: PeriodKey) -> Result<PeriodStatement, AppError> {
        let Some(period) = self.fee_repository.find_period(key).await? else {
            return Ok(PeriodStatement::empty());
        };

        let logs = self
            .fee_repository
            .find_logs(key, LogFilter::kinds(&[LogKind::Payment, LogKind::Deposit]))
            .await?;

        PeriodStatement::from_logs(period.carry_over, logs)
    }

    /// Sum of a member's payments in the period. Exemptions are not counted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the period does not exist.
    pub async fn amount(&self, key: PeriodKey, member_id: &str) -> Result<i64, AppError> {
        self.require_period(key).await?;

        let logs = self
            .fee_repository
            .find_logs(key, LogFilter::kinds(&[LogKind::Payment]).for_member(member_id))
            .await?;

        Ok(ledger::member_payments(&logs)?
            .get(member_id)
            .copied()
            .unwrap_or(0))
    }

    /// Members whose payments plus exemptions reach the due amount.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the period does not exist.
    pub async fn payers(&self, key: PeriodKey) -> Result<Vec<Member>, AppError> {
        let period = self.require_period(key).await?;
        let ids = self.payer_ids(&period).await?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.member_directory.find_by_ids(ids).await
    }

    /// Billable members who are not payers, with the amount each still owes.
    ///
    /// The reserved administrative account is never listed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the period does not exist.
    pub async fn deptors(&self, key: PeriodKey) -> Result<Vec<Deptor>, AppError> {
        let period = self.require_period(key).await?;
        let logs = self.fee_repository.find_logs(key, LogFilter::all()).await?;

        let credits = ledger::member_credits(&logs, period.amount)?;
        let payments = ledger::member_payments(&logs)?;

        let mut excluding = ledger::payer_ids(&credits, period.amount);
        excluding.push(self.reserved_member_id.clone());

        let members = self.member_directory.find_billable(excluding).await?;

        Ok(members
            .into_iter()
            .map(|member| {
                let paid = payments.get(&member.id).copied().unwrap_or(0);
                Deptor {
                    owed: ledger::shortfall(period.amount, paid),
                    member,
                }
            })
            .collect())
    }

    /// Records one payment log per entry, all or none.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the batch is empty or an amount is negative
    ///   or above [`ledger::MAX_AMOUNT`]
    /// - [`AppError::NotFound`] if the period does not exist
    pub async fn pay(
        &self,
        key: PeriodKey,
        payments: Vec<MemberPayment>,
    ) -> Result<Vec<Log>, AppError> {
        if payments.is_empty() {
            return Err(AppError::bad_request(
                "At least one payment is required",
                json!({}),
            ));
        }
        if let Some(bad) = payments.iter().find(|p| p.amount < 0) {
            return Err(AppError::bad_request(
                "Payment amount must not be negative",
                json!({ "member_id": bad.member_id, "amount": bad.amount }),
            ));
        }
        for payment in &payments {
            ledger::check_amount("amount", payment.amount)?;
        }

        self.require_period(key).await?;

        let new_logs = payments
            .into_iter()
            .map(|p| NewLog::payment(p.member_id, p.amount))
            .collect();

        self.record(key, new_logs).await
    }

    /// Records a club-level deposit. Negative amounts record an expense.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the description is blank or `amount` is
    ///   out of range
    /// - [`AppError::NotFound`] if the period does not exist
    pub async fn deposit(
        &self,
        key: PeriodKey,
        amount: i64,
        description: &str,
    ) -> Result<Log, AppError> {
        if description.trim().is_empty() {
            return Err(AppError::bad_request(
                "Description must not be empty",
                json!({}),
            ));
        }
        ledger::check_amount("amount", amount)?;

        self.require_period(key).await?;

        let mut logs = self
            .record(key, vec![NewLog::deposit(amount, description.trim())])
            .await?;
        Self::single(&mut logs)
    }

    /// Exempts a member from the period's fee.
    ///
    /// The exemption log carries the period's due amount.
    ///
    /// # Errors
    ///
    /// - [`AppError::AlreadyExempted`] if the member already holds an exemption
    /// - [`AppError::NotFound`] if the period does not exist
    pub async fn exempt(&self, key: PeriodKey, member_id: &str) -> Result<Log, AppError> {
        let period = self.require_period(key).await?;

        let existing = self
            .fee_repository
            .find_logs(key, LogFilter::kinds(&[LogKind::Exemption]).for_member(member_id))
            .await?;

        if !existing.is_empty() {
            tracing::warn!(
                year = key.year,
                semester = key.semester,
                member_id,
                "Member already exempted"
            );
            return Err(AppError::AlreadyExempted {
                year: key.year,
                semester: key.semester,
                member_id: member_id.to_string(),
            });
        }

        let mut logs = self
            .record(key, vec![NewLog::exemption(member_id, period.amount)])
            .await?;
        Self::single(&mut logs)
    }

    async fn require_period(&self, key: PeriodKey) -> Result<FeePeriod, AppError> {
        self.fee_repository.find_period(key).await?.ok_or_else(|| {
            AppError::not_found(
                "Fee period not found",
                json!({ "year": key.year, "semester": key.semester }),
            )
        })
    }

    async fn payer_ids(&self, period: &FeePeriod) -> Result<Vec<String>, AppError> {
        let logs = self
            .fee_repository
            .find_logs(
                period.key(),
                LogFilter::kinds(&[LogKind::Payment, LogKind::Exemption]),
            )
            .await?;

        let credits = ledger::member_credits(&logs, period.amount)?;
        Ok(ledger::payer_ids(&credits, period.amount))
    }

    async fn record(&self, key: PeriodKey, new_logs: Vec<NewLog>) -> Result<Vec<Log>, AppError> {
        let logs = self.fee_repository.append_logs(key, new_logs).await?;

        for log in &logs {
            metrics::counter!("fee_logs_recorded_total", "kind" => log.kind.as_str()).increment(1);
            tracing::info!(
                year = key.year,
                semester = key.semester,
                log_id = log.id,
                kind = %log.kind,
                member_id = log.member_id.as_deref(),
                amount = log.amount,
                "Fee log recorded"
            );
        }

        Ok(logs)
    }

    fn single(logs: &mut Vec<Log>) -> Result<Log, AppError> {
        logs.pop().ok_or_else(|| {
            AppError::internal("Store returned no log for a single insert", json!({}))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockFeeRepository, MockMemberDirectory};
    use chrono::{Duration, TimeZone, Utc};

    fn key(year: i32, semester: u8) -> PeriodKey {
        PeriodKey::new(year, semester).unwrap()
    }

    fn period(key: PeriodKey, amount: i64, carry_over: i64) -> FeePeriod {
        FeePeriod {
            id: 1,
            year: key.year,
            semester: key.semester,
            amount,
            carry_over,
            log_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn log(id: i64, member: Option<&str>, amount: i64, kind: LogKind) -> Log {
        Log {
            id,
            member_id: member.map(str::to_string),
            description: String::new(),
            amount,
            kind,
            created_at: Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
                + Duration::seconds(id),
        }
    }

    fn service(
        fees: MockFeeRepository,
        members: MockMemberDirectory,
    ) -> FeeService<MockFeeRepository, MockMemberDirectory> {
        FeeService::new(Arc::new(fees), Arc::new(members), "MASTER")
    }

    #[tokio::test]
    async fn test_create_period_carries_over_previous_total() {
        let mut fees = MockFeeRepository::new();
        let current = key(2024, 1);
        let previous = key(2023, 2);

        fees.expect_find_period()
            .withf(move |k| *k == current)
            .times(1)
            .returning(|_| Ok(None));
        fees.expect_find_period()
            .withf(move |k| *k == previous)
            .times(1)
            .returning(move |_| Ok(Some(period(previous, 30_000, 2_000))));
        fees.expect_find_logs().times(1).returning(|_, _| {
            Ok(vec![
                log(1, Some("A"), 30_000, LogKind::Payment),
                log(2, None, 5_000, LogKind::Deposit),
            ])
        });
        fees.expect_create_period()
            .withf(|new| new.carry_over == 37_000 && new.amount == 25_000)
            .times(1)
            .returning(|new| Ok(period(new.key, new.amount, new.carry_over)));

        let created = service(fees, MockMemberDirectory::new())
            .create_period(current, 25_000)
            .await
            .unwrap();

        assert_eq!(created.carry_over, 37_000);
        assert_eq!(created.key(), current);
    }

    #[tokio::test]
    async fn test_create_period_without_predecessor_starts_at_zero() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period().times(2).returning(|_| Ok(None));
        fees.expect_find_logs().never();
        fees.expect_create_period()
            .withf(|new| new.carry_over == 0)
            .times(1)
            .returning(|new| Ok(period(new.key, new.amount, new.carry_over)));

        let created = service(fees, MockMemberDirectory::new())
            .create_period(key(2024, 2), 30_000)
            .await
            .unwrap();

        assert_eq!(created.carry_over, 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_period() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period()
            .times(1)
            .returning(|k| Ok(Some(period(k, 30_000, 0))));
        fees.expect_create_period().never();

        let result = service(fees, MockMemberDirectory::new())
            .create_period(key(2024, 1), 30_000)
            .await;

        assert!(matches!(
            result,
            Err(AppError::DuplicatePeriod {
                year: 2024,
                semester: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_amount() {
        let result = service(MockFeeRepository::new(), MockMemberDirectory::new())
            .create_period(key(2024, 1), -1)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_amounts_above_limit_are_rejected() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period().never();
        fees.expect_append_logs().never();
        let service = service(fees, MockMemberDirectory::new());
        let too_big = ledger::MAX_AMOUNT + 1;

        let created = service.create_period(key(2024, 1), too_big).await;
        let paid = service
            .pay(
                key(2024, 1),
                vec![
                    MemberPayment {
                        member_id: "A".to_string(),
                        amount: i64::MAX,
                    },
                    MemberPayment {
                        member_id: "A".to_string(),
                        amount: 1,
                    },
                ],
            )
            .await;
        let deposited = service.deposit(key(2024, 1), -too_big, "refund").await;

        assert!(matches!(created, Err(AppError::Validation { .. })));
        assert!(matches!(paid, Err(AppError::Validation { .. })));
        assert!(matches!(deposited, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_search_reports_overflowing_total_as_error() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period()
            .returning(|k| Ok(Some(period(k, 30_000, i64::MAX))));
        fees.expect_find_logs()
            .returning(|_, _| Ok(vec![log(1, Some("A"), 1, LogKind::Payment)]));

        let result = service(fees, MockMemberDirectory::new())
            .search(key(2024, 1))
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_search_missing_period_is_empty() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period().times(1).returning(|_| Ok(None));

        let statement = service(fees, MockMemberDirectory::new())
            .search(key(2030, 1))
            .await
            .unwrap();

        assert_eq!(statement, PeriodStatement::empty());
    }

    #[tokio::test]
    async fn test_amount_requires_period() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period().times(1).returning(|_| Ok(None));

        let result = service(fees, MockMemberDirectory::new())
            .amount(key(2024, 1), "A")
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_amount_sums_member_payments() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period()
            .returning(|k| Ok(Some(period(k, 30_000, 0))));
        fees.expect_find_logs()
            .withf(|_, filter| {
                filter.kinds == vec![LogKind::Payment]
                    && filter.member_ids == Some(vec!["A".to_string()])
            })
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    log(1, Some("A"), 10_000, LogKind::Payment),
                    log(2, Some("A"), 7_000, LogKind::Payment),
                ])
            });

        let sum = service(fees, MockMemberDirectory::new())
            .amount(key(2024, 1), "A")
            .await
            .unwrap();

        assert_eq!(sum, 17_000);
    }

    #[tokio::test]
    async fn test_payers_skips_directory_when_nobody_paid() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period()
            .returning(|k| Ok(Some(period(k, 30_000, 0))));
        fees.expect_find_logs().returning(|_, _| {
            Ok(vec![log(1, Some("B"), 10_000, LogKind::Payment)])
        });
        let mut members = MockMemberDirectory::new();
        members.expect_find_by_ids().never();

        let payers = service(fees, members).payers(key(2024, 1)).await.unwrap();
        assert!(payers.is_empty());
    }

    #[tokio::test]
    async fn test_deptors_excludes_payers_and_reserved_account() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period()
            .returning(|k| Ok(Some(period(k, 30_000, 0))));
        fees.expect_find_logs().returning(|_, _| {
            Ok(vec![
                log(1, Some("A"), 30_000, LogKind::Payment),
                log(2, Some("B"), 10_000, LogKind::Payment),
                log(3, Some("C"), 30_000, LogKind::Exemption),
            ])
        });

        let mut members = MockMemberDirectory::new();
        members
            .expect_find_billable()
            .withf(|excluding| {
                excluding == &vec!["A".to_string(), "C".to_string(), "MASTER".to_string()]
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    Member::new("B", "Park", "CS"),
                    Member::new("D", "Choi", "Math"),
                ])
            });

        let deptors = service(fees, members).deptors(key(2024, 1)).await.unwrap();

        assert_eq!(deptors.len(), 2);
        assert_eq!(deptors[0].member.id, "B");
        assert_eq!(deptors[0].owed, 20_000);
        assert_eq!(deptors[1].member.id, "D");
        assert_eq!(deptors[1].owed, 30_000);
    }

    #[tokio::test]
    async fn test_pay_rejects_empty_batch() {
        let result = service(MockFeeRepository::new(), MockMemberDirectory::new())
            .pay(key(2024, 1), Vec::new())
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_pay_appends_one_log_per_member() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period()
            .returning(|k| Ok(Some(period(k, 30_000, 0))));
        fees.expect_append_logs()
            .withf(|_, logs| {
                logs.len() == 2
                    && logs.iter().all(|l| l.kind == LogKind::Payment)
                    && logs[0].member_id.as_deref() == Some("A")
            })
            .times(1)
            .returning(|_, logs| {
                Ok(logs
                    .into_iter()
                    .enumerate()
                    .map(|(i, l)| log(i as i64 + 1, l.member_id.as_deref(), l.amount, l.kind))
                    .collect())
            });

        let logs = service(fees, MockMemberDirectory::new())
            .pay(
                key(2024, 1),
                vec![
                    MemberPayment {
                        member_id: "A".to_string(),
                        amount: 30_000,
                    },
                    MemberPayment {
                        member_id: "B".to_string(),
                        amount: 10_000,
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(logs.len(), 2);
    }

    #[tokio::test]
    async fn test_pay_missing_period_writes_nothing() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period().returning(|_| Ok(None));
        fees.expect_append_logs().never();

        let result = service(fees, MockMemberDirectory::new())
            .pay(
                key(2024, 1),
                vec![MemberPayment {
                    member_id: "A".to_string(),
                    amount: 30_000,
                }],
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deposit_requires_description() {
        let result = service(MockFeeRepository::new(), MockMemberDirectory::new())
            .deposit(key(2024, 1), 1_000, "   ")
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_exempt_twice_fails() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period()
            .returning(|k| Ok(Some(period(k, 30_000, 0))));
        fees.expect_find_logs()
            .returning(|_, _| Ok(vec![log(1, Some("C"), 30_000, LogKind::Exemption)]));
        fees.expect_append_logs().never();

        let result = service(fees, MockMemberDirectory::new())
            .exempt(key(2024, 1), "C")
            .await;

        assert!(matches!(
            result,
            Err(AppError::AlreadyExempted { member_id, .. }) if member_id == "C"
        ));
    }

    #[tokio::test]
    async fn test_exempt_uses_due_amount() {
        let mut fees = MockFeeRepository::new();
        fees.expect_find_period()
            .returning(|k| Ok(Some(period(k, 30_000, 0))));
        fees.expect_find_logs().returning(|_, _| Ok(Vec::new()));
        fees.expect_append_logs()
            .withf(|_, logs| {
                logs.len() == 1 && logs[0].kind == LogKind::Exemption && logs[0].amount == 30_000
            })
            .times(1)
            .returning(|_, logs| Ok(vec![log(9, Some("C"), logs[0].amount, logs[0].kind)]));

        let log = service(fees, MockMemberDirectory::new())
            .exempt(key(2024, 1), "C")
            .await
            .unwrap();

        assert_eq!(log.amount, 30_000);
    }
}
