//! PostgreSQL implementation of the fee repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{FeePeriod, Log, LogKind, NewFeePeriod, NewLog, PeriodKey};
use crate::domain::repositories::{FeeRepository, LogFilter};
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on;

const PERIOD_UNIQUE: &str = "fee_periods_year_semester_key";
const EXEMPTION_UNIQUE: &str = "fee_logs_one_exemption_idx";

#[derive(sqlx::FromRow)]
struct PeriodRow {
    id: i64,
    year: i32,
    semester: i16,
    amount: i64,
    carry_over: i64,
    log_ids: Vec<i64>,
    created_at: DateTime<Utc>,
}

impl PeriodRow {
    fn into_entity(self) -> Result<FeePeriod, AppError> {
        let semester = u8::try_from(self.semester).map_err(|_| {
            AppError::internal(
                "Invalid semester in store",
                json!({ "semester": self.semester }),
            )
        })?;

        Ok(FeePeriod {
            id: self.id,
            year: self.year,
            semester,
            amount: self.amount,
            carry_over: self.carry_over,
            log_ids: self.log_ids,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    member_id: Option<String>,
    description: String,
    amount: i64,
    kind: String,
    created_at: DateTime<Utc>,
}

impl LogRow {
    fn into_entity(self) -> Result<Log, AppError> {
        Ok(Log {
            id: self.id,
            member_id: self.member_id,
            description: self.description,
            amount: self.amount,
            kind: self.kind.parse::<LogKind>()?,
            created_at: self.created_at,
        })
    }
}

/// PostgreSQL repository for fee periods and fee logs.
///
/// Every statement runs under the pool's `statement_timeout`; a cancelled
/// statement surfaces as [`AppError::Unavailable`].
pub struct PgFeeRepository {
    pool: Arc<PgPool>,
}

impl PgFeeRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeeRepository for PgFeeRepository {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }

    async fn create_period(&self, new_period: NewFeePeriod) -> Result<FeePeriod, AppError> {
        let key = new_period.key;

        let row = sqlx::query_as::<_, PeriodRow>(
            r#"
            INSERT INTO fee_periods (year, semester, amount, carry_over)
            VALUES ($1, $2, $3, $4)
            RETURNING id, year, semester, amount, carry_over,
                      ARRAY[]::BIGINT[] AS log_ids, created_at
            "#,
        )
        .bind(key.year)
        .bind(i16::from(key.semester))
        .bind(new_period.amount)
        .bind(new_period.carry_over)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, PERIOD_UNIQUE) {
                AppError::DuplicatePeriod {
                    year: key.year,
                    semester: key.semester,
                }
            } else {
                AppError::from(e)
            }
        })?;

        row.into_entity()
    }

    async fn find_period(&self, key: PeriodKey) -> Result<Option<FeePeriod>, AppError> {
        let row = sqlx::query_as::<_, PeriodRow>(
            r#"
            SELECT p.id, p.year, p.semester, p.amount, p.carry_over,
                   COALESCE(
                       (SELECT array_agg(l.id ORDER BY l.created_at, l.id)
                        FROM fee_logs l
                        WHERE l.period_id = p.id),
                       ARRAY[]::BIGINT[]
                   ) AS log_ids,
                   p.created_at
            FROM fee_periods p
            WHERE p.year = $1 AND p.semester = $2
            "#,
        )
        .bind(key.year)
        .bind(i16::from(key.semester))
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(PeriodRow::into_entity).transpose()
    }

    async fn find_logs(&self, key: PeriodKey, filter: LogFilter) -> Result<Vec<Log>, AppError> {
        let kinds: Vec<String> = filter
            .kinds
            .iter()
            .map(|kind| kind.as_str().to_string())
            .collect();

        let rows = sqlx::query_as::<_, LogRow>(
            r#"
            SELECT l.id, l.member_id, l.description, l.amount, l.kind, l.created_at
            FROM fee_logs l
            JOIN fee_periods p ON p.id = l.period_id
            WHERE p.year = $1
              AND p.semester = $2
              AND l.kind = ANY($3::TEXT[])
              AND ($4::TEXT[] IS NULL OR l.member_id = ANY($4::TEXT[]))
            ORDER BY l.created_at, l.id
            "#,
        )
        .bind(key.year)
        .bind(i16::from(key.semester))
        .bind(kinds)
        .bind(filter.member_ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(LogRow::into_entity).collect()
    }

    async fn append_logs(&self, key: PeriodKey, logs: Vec<NewLog>) -> Result<Vec<Log>, AppError> {
        let mut tx = self.pool.begin().await?;

        let period_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM fee_periods
            WHERE year = $1 AND semester = $2
            FOR SHARE
            "#,
        )
        .bind(key.year)
        .bind(i16::from(key.semester))
        .fetch_optional(&mut *tx)
        .await?;

        let Some(period_id) = period_id else {
            return Err(AppError::not_found(
                "Fee period not found",
                json!({ "year": key.year, "semester": key.semester }),
            ));
        };

        let mut inserted = Vec::with_capacity(logs.len());
        for log in logs {
            let member_id = log.member_id.clone();
            let row = sqlx::query_as::<_, LogRow>(
                r#"
                INSERT INTO fee_logs (period_id, member_id, description, amount, kind)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, member_id, description, amount, kind, created_at
                "#,
            )
            .bind(period_id)
            .bind(log.member_id)
            .bind(log.description)
            .bind(log.amount)
            .bind(log.kind.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation_on(&e, EXEMPTION_UNIQUE) {
                    AppError::AlreadyExempted {
                        year: key.year,
                        semester: key.semester,
                        member_id: member_id.unwrap_or_default(),
                    }
                } else {
                    AppError::from(e)
                }
            })?;

            inserted.push(row.into_entity()?);
        }

        tx.commit().await?;

        Ok(inserted)
    }
}
