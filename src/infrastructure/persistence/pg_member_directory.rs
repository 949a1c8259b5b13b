//! PostgreSQL implementation of the membership directory.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Attendance, Member};
use crate::domain::repositories::MemberDirectory;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: String,
    name: String,
    department: String,
    attendance: String,
    approved: bool,
    on_delete: bool,
    on_graduate: bool,
}

impl MemberRow {
    fn into_entity(self) -> Result<Member, AppError> {
        Ok(Member {
            id: self.id,
            name: self.name,
            department: self.department,
            attendance: self.attendance.parse::<Attendance>()?,
            approved: self.approved,
            on_delete: self.on_delete,
            on_graduate: self.on_graduate,
        })
    }
}

/// Reads members from the shared `members` table.
pub struct PgMemberDirectory {
    pool: Arc<PgPool>,
}

impl PgMemberDirectory {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberDirectory for PgMemberDirectory {
    async fn find_by_ids(&self, ids: Vec<String>) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, name, department, attendance, approved, on_delete, on_graduate
            FROM members
            WHERE id = ANY($1::TEXT[])
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(MemberRow::into_entity).collect()
    }

    async fn find_billable(&self, excluding: Vec<String>) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, name, department, attendance, approved, on_delete, on_graduate
            FROM members
            WHERE approved
              AND attendance <> 'graduated'
              AND NOT (id = ANY($1::TEXT[]))
            ORDER BY id
            "#,
        )
        .bind(excluding)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(MemberRow::into_entity).collect()
    }
}
