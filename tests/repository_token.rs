//! PostgreSQL token repository tests. Each test gets a fresh database from `DATABASE_URL`.

use sqlx::PgPool;
use std::sync::Arc;

use club_ledger::domain::repositories::{NewApiToken, TokenRepository};
use club_ledger::error::AppError;
use club_ledger::infrastructure::persistence::PgTokenRepository;

async fn repo_with_member(pool: PgPool) -> PgTokenRepository {
    sqlx::query("INSERT INTO members (id, name, approved) VALUES ('A', 'Kim', TRUE)")
        .execute(&pool)
        .await
        .unwrap();
    PgTokenRepository::new(Arc::new(pool))
}

fn new_token(name: &str, hash: &str) -> NewApiToken {
    NewApiToken {
        name: name.to_string(),
        token_hash: hash.to_string(),
        member_id: "A".to_string(),
        fee_manager: true,
    }
}

#[sqlx::test]
async fn test_create_token(pool: PgPool) {
    let repo = repo_with_member(pool).await;

    let token = repo.create_token(new_token("laptop", "hash123")).await.unwrap();

    assert_eq!(token.name, "laptop");
    assert_eq!(token.member_id, "A");
    assert!(token.fee_manager);
    assert!(token.is_active());
    assert!(token.last_used_at.is_none());
}

#[sqlx::test]
async fn test_duplicate_name_conflicts(pool: PgPool) {
    let repo = repo_with_member(pool).await;
    repo.create_token(new_token("laptop", "hash1")).await.unwrap();

    let result = repo.create_token(new_token("laptop", "hash2")).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_find_active_and_touch(pool: PgPool) {
    let repo = repo_with_member(pool).await;
    repo.create_token(new_token("laptop", "hash1")).await.unwrap();

    assert!(repo.find_active_by_hash("hash1").await.unwrap().is_some());
    assert!(repo.find_active_by_hash("missing").await.unwrap().is_none());

    repo.update_last_used("hash1").await.unwrap();
    let token = repo.find_by_name("laptop").await.unwrap().unwrap();
    assert!(token.last_used_at.is_some());
}

#[sqlx::test]
async fn test_revoke_token(pool: PgPool) {
    let repo = repo_with_member(pool).await;
    let token = repo.create_token(new_token("laptop", "hash1")).await.unwrap();

    repo.revoke_token(token.id).await.unwrap();

    assert!(repo.find_active_by_hash("hash1").await.unwrap().is_none());
    assert!(!repo.find_by_id(token.id).await.unwrap().unwrap().is_active());

    let again = repo.revoke_token(token.id).await;
    assert!(matches!(again, Err(AppError::NotFound { .. })));
}
