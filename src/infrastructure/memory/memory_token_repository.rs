//! In-process token repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::repositories::{ApiToken, NewApiToken, TokenRepository};
use crate::error::AppError;

#[derive(Default)]
struct Store {
    tokens: BTreeMap<i64, ApiToken>,
    next_id: i64,
}

/// Token repository backed by process memory.
#[derive(Default)]
pub struct MemoryTokenRepository {
    store: RwLock<Store>,
}

impl MemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn find_active_by_hash(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .tokens
            .values()
            .find(|token| token.token_hash == token_hash && token.is_active())
            .cloned())
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        if let Some(token) = store
            .tokens
            .values_mut()
            .find(|token| token.token_hash == token_hash && token.is_active())
        {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(&self, new_token: NewApiToken) -> Result<ApiToken, AppError> {
        let mut store = self.store.write().await;

        if store
            .tokens
            .values()
            .any(|t| t.name == new_token.name || t.token_hash == new_token.token_hash)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "name": new_token.name }),
            ));
        }

        store.next_id += 1;
        let token = ApiToken {
            id: store.next_id,
            name: new_token.name,
            token_hash: new_token.token_hash,
            member_id: new_token.member_id,
            fee_manager: new_token.fee_manager,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        store.tokens.insert(token.id, token.clone());

        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.store.read().await.tokens.values().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        Ok(self.store.read().await.tokens.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .store
            .read()
            .await
            .tokens
            .values()
            .find(|token| token.name == name)
            .cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        match store.tokens.get_mut(&id) {
            Some(token) if token.is_active() => {
                token.revoked_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(AppError::not_found(
                "Token not found or already revoked",
                json!({ "id": id }),
            )),
        }
    }
}
