//! Authentication service for API token validation.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::Principal;
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::token::hash_token;
use serde_json::json;

/// Service for authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. Resolved principals are cached by hash for `cache_ttl`.
pub struct AuthService<R: TokenRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    signing_secret: String,
    cache_ttl: Duration,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `repository` - token repository for DB operations
    /// - `cache` - principal cache, consulted before the repository
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    /// - `cache_ttl` - how long a resolved principal stays cached
    pub fn new(
        repository: Arc<R>,
        cache: Arc<dyn CacheService>,
        signing_secret: String,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            signing_secret,
            cache_ttl,
        }
    }

    /// Hashes a raw token with the server signing secret.
    pub fn hash(&self, token: &str) -> String {
        hash_token(&self.signing_secret, token)
    }

    /// Resolves a raw token to the member it was issued for.
    ///
    /// On a cache miss, the token is looked up in the repository, cached and
    /// its `last_used_at` timestamp is touched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or revoked.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let token_hash = self.hash(token);

        match self.cache.get_principal(&token_hash).await {
            Ok(Some(principal)) => return Ok(principal),
            Ok(None) => {}
            Err(e) => tracing::warn!("Principal cache lookup failed: {}", e),
        }

        let Some(token) = self.repository.find_active_by_hash(&token_hash).await? else {
            return Err(AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Invalid or revoked token"}),
            ));
        };

        let principal = Principal {
            member_id: token.member_id,
            fee_manager: token.fee_manager,
        };

        if let Err(e) = self
            .cache
            .set_principal(&token_hash, &principal, self.cache_ttl)
            .await
        {
            tracing::warn!("Principal cache write failed: {}", e);
        }

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            tracing::warn!("Failed to touch token last_used_at: {}", e);
        }

        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{ApiToken, MockTokenRepository};
    use crate::infrastructure::cache::MemoryCache;
    use chrono::Utc;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn active_token(hash: &str, fee_manager: bool) -> ApiToken {
        ApiToken {
            id: 1,
            name: "treasurer".to_string(),
            token_hash: hash.to_string(),
            member_id: "20181681".to_string(),
            fee_manager,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        }
    }

    fn service(repo: MockTokenRepository) -> AuthService<MockTokenRepository> {
        AuthService::new(
            Arc::new(repo),
            Arc::new(MemoryCache::new()),
            test_secret(),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockTokenRepository::new();

        let token = "valid-token";
        let expected_hash = hash_token(&test_secret(), token);
        let returned_hash = expected_hash.clone();

        mock_repo
            .expect_find_active_by_hash()
            .withf(move |hash| hash == &expected_hash)
            .times(1)
            .returning(move |_| Ok(Some(active_token(&returned_hash, true))));

        mock_repo
            .expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let principal = service(mock_repo).authenticate(token).await.unwrap();

        assert_eq!(principal.member_id, "20181681");
        assert!(principal.fee_manager);
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active_by_hash()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo.expect_update_last_used().never();

        let result = service(mock_repo).authenticate("invalid-token").await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active_by_hash()
            .times(1)
            .returning(|hash| Ok(Some(active_token(hash, false))));
        mock_repo
            .expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let service = service(mock_repo);

        let first = service.authenticate("member-token").await.unwrap();
        let second = service.authenticate("member-token").await.unwrap();

        assert_eq!(first, second);
        assert!(!second.fee_manager);
    }

    #[tokio::test]
    async fn test_last_used_failure_does_not_reject() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active_by_hash()
            .returning(|hash| Ok(Some(active_token(hash, true))));
        mock_repo
            .expect_update_last_used()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        assert!(service(mock_repo).authenticate("token").await.is_ok());
    }
}
