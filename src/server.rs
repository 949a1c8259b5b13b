//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, migrations, cache setup and the Axum server
//! lifecycle.

use crate::application::services::{AuthService, FeeService};
use crate::config::Config;
use crate::domain::repositories::{FeeRepository, MemberDirectory, TokenRepository};
use crate::infrastructure::cache::{CacheService, MemoryCache, RedisCache};
use crate::infrastructure::persistence::{PgFeeRepository, PgMemberDirectory, PgTokenRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Opens the PostgreSQL pool with the configured limits.
///
/// Every connection gets `statement_timeout = STORE_TIMEOUT_MS`, so no store
/// call can outlive it; pool acquisition is bounded by `DB_CONNECT_TIMEOUT`.
///
/// # Errors
///
/// Returns an error if the URL is malformed or no connection can be made.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let options = PgConnectOptions::from_str(&config.database_url)
        .context("Invalid DATABASE_URL")?
        .options([("statement_timeout", config.store_timeout_ms.to_string())]);

    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect_with(options)
        .await
        .context("Failed to connect to database")
}

/// Picks the principal cache: Redis when configured and reachable, otherwise
/// an in-memory cache with a background sweeper.
async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Principal cache: Redis");
                return Arc::new(redis);
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using in-memory cache.", e);
            }
        }
    }

    let memory = Arc::new(MemoryCache::new());
    MemoryCache::spawn_sweeper(&memory, config.auth_cache_sweep_interval());
    tracing::info!(
        sweep_seconds = config.auth_cache_sweep_seconds,
        "Principal cache: in-memory"
    );
    memory
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Principal cache (Redis or in-memory)
/// - Fee and auth services
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = Arc::new(connect_pool(&config).await?);
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(pool.as_ref())
        .await
        .context("Failed to run migrations")?;

    let cache = build_cache(&config).await;

    let fee_repository: Arc<dyn FeeRepository> = Arc::new(PgFeeRepository::new(pool.clone()));
    let member_directory: Arc<dyn MemberDirectory> =
        Arc::new(PgMemberDirectory::new(pool.clone()));
    let token_repository: Arc<dyn TokenRepository> =
        Arc::new(PgTokenRepository::new(pool.clone()));

    let fee_service = Arc::new(FeeService::new(
        fee_repository,
        member_directory,
        config.reserved_member_id.clone(),
    ));
    let auth_service = Arc::new(AuthService::new(
        token_repository,
        cache.clone(),
        config.token_signing_secret.clone(),
        config.auth_cache_ttl(),
    ));

    let state = AppState::new(fee_service, auth_service, cache);

    let app = app_router(state, config.rate_limit);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
