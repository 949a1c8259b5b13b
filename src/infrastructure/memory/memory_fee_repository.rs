//! In-process fee repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

use crate::domain::entities::{FeePeriod, Log, LogKind, NewFeePeriod, NewLog, PeriodKey};
use crate::domain::repositories::{FeeRepository, LogFilter};
use crate::error::AppError;

#[derive(Default)]
struct Store {
    periods: BTreeMap<PeriodKey, FeePeriod>,
    logs: BTreeMap<i64, Log>,
    next_period_id: i64,
    next_log_id: i64,
}

/// Fee repository backed by process memory.
///
/// A single write lock covers each mutation, so the duplicate checks and the
/// batch insert of [`FeeRepository::append_logs`] cannot interleave with
/// another writer.
#[derive(Default)]
pub struct MemoryFeeRepository {
    store: RwLock<Store>,
}

impl MemoryFeeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeeRepository for MemoryFeeRepository {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_period(&self, new_period: NewFeePeriod) -> Result<FeePeriod, AppError> {
        let mut store = self.store.write().await;
        let key = new_period.key;

        if store.periods.contains_key(&key) {
            return Err(AppError::DuplicatePeriod {
                year: key.year,
                semester: key.semester,
            });
        }

        store.next_period_id += 1;
        let period = FeePeriod {
            id: store.next_period_id,
            year: key.year,
            semester: key.semester,
            amount: new_period.amount,
            carry_over: new_period.carry_over,
            log_ids: Vec::new(),
            created_at: Utc::now(),
        };
        store.periods.insert(key, period.clone());

        Ok(period)
    }

    async fn find_period(&self, key: PeriodKey) -> Result<Option<FeePeriod>, AppError> {
        Ok(self.store.read().await.periods.get(&key).cloned())
    }

    async fn find_logs(&self, key: PeriodKey, filter: LogFilter) -> Result<Vec<Log>, AppError> {
        let store = self.store.read().await;
        let Some(period) = store.periods.get(&key) else {
            return Ok(Vec::new());
        };

        let mut logs: Vec<Log> = period
            .log_ids
            .iter()
            .filter_map(|id| store.logs.get(id))
            .filter(|log| filter.matches(log))
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(logs)
    }

    async fn append_logs(&self, key: PeriodKey, logs: Vec<NewLog>) -> Result<Vec<Log>, AppError> {
        let mut store = self.store.write().await;

        let Some(period) = store.periods.get(&key) else {
            return Err(AppError::not_found(
                "Fee period not found",
                json!({ "year": key.year, "semester": key.semester }),
            ));
        };

        let mut exempted: HashSet<String> = period
            .log_ids
            .iter()
            .filter_map(|id| store.logs.get(id))
            .filter(|log| log.kind == LogKind::Exemption)
            .filter_map(|log| log.member_id.clone())
            .collect();

        for log in logs.iter().filter(|log| log.kind == LogKind::Exemption) {
            let member_id = log.member_id.clone().unwrap_or_default();
            if !exempted.insert(member_id.clone()) {
                return Err(AppError::AlreadyExempted {
                    year: key.year,
                    semester: key.semester,
                    member_id,
                });
            }
        }

        let now = Utc::now();
        let mut inserted = Vec::with_capacity(logs.len());
        for new_log in logs {
            store.next_log_id += 1;
            inserted.push(Log {
                id: store.next_log_id,
                member_id: new_log.member_id,
                description: new_log.description,
                amount: new_log.amount,
                kind: new_log.kind,
                created_at: now,
            });
        }

        for log in &inserted {
            store.logs.insert(log.id, log.clone());
        }
        if let Some(period) = store.periods.get_mut(&key) {
            period.log_ids.extend(inserted.iter().map(|log| log.id));
        }

        Ok(inserted)
    }
}
