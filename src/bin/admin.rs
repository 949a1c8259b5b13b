//! CLI administration tool for club-ledger.
//!
//! Manages API tokens, opens and inspects fee periods, and performs database
//! checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Issue a token for a member
//! cargo run --bin admin -- token create --member 20181681 --fee-manager
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token
//! cargo run --bin admin -- token revoke "treasurer laptop"
//!
//! # Open a period and print its statement
//! cargo run --bin admin -- period open --year 2024 --semester 1 --amount 30000
//! cargo run --bin admin -- period show --year 2024 --semester 1
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`) and `TOKEN_SIGNING_SECRET`
//! are required.

use club_ledger::application::services::FeeService;
use club_ledger::config::{self, Config};
use club_ledger::domain::entities::PeriodKey;
use club_ledger::domain::repositories::{NewApiToken, TokenRepository};
use club_ledger::infrastructure::cache::{CacheService, RedisCache};
use club_ledger::infrastructure::persistence::{
    PgFeeRepository, PgMemberDirectory, PgTokenRepository,
};
use club_ledger::server::connect_pool;
use club_ledger::utils::token::{generate_token, hash_token};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing club-ledger.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Open and inspect fee periods
    Period {
        #[command(subcommand)]
        action: PeriodAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a new API token for a member
    Create {
        /// Token name (e.g., "treasurer laptop")
        #[arg(short, long)]
        name: Option<String>,

        /// Member the token authenticates as
        #[arg(short, long)]
        member: Option<String>,

        /// Grant fee-manager permission
        #[arg(long)]
        fee_manager: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum PeriodAction {
    /// Open a period, carrying over the previous period's total
    Open {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        semester: u8,
        /// Due amount per member
        #[arg(long)]
        amount: i64,
    },

    /// Print a period's cash statement
    Show {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        semester: u8,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool, &config).await?,
        Commands::Period { action } => handle_period_action(action, &pool, &config).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_token_action(action: TokenAction, pool: &PgPool, config: &Config) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create {
            name,
            member,
            fee_manager,
            yes,
        } => {
            create_token(repo, config, name, member, fee_manager, yes).await?;
        }
        TokenAction::List => {
            list_tokens(repo).await?;
        }
        TokenAction::Revoke { name_or_id } => {
            revoke_token(repo, config, name_or_id).await?;
        }
    }

    Ok(())
}

/// Issues a new API token with interactive prompts.
///
/// Only the HMAC of the token is stored; the raw value is shown once.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    config: &Config,
    name: Option<String>,
    member: Option<String>,
    fee_manager: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let member_id = match member {
        Some(m) => m,
        None => Input::new().with_prompt("Member id").interact_text()?,
    };

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text(format!("{member_id} token"))
            .interact_text()?,
    };

    let token_value = generate_token().context("Failed to generate token")?;

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:        {}", token_name.cyan());
    println!("  Member:      {}", member_id.cyan());
    println!(
        "  Fee manager: {}",
        if fee_manager { "yes".green() } else { "no".bright_black() }
    );
    println!("  Token:       {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&config.token_signing_secret, &token_value);

    repo.create_token(NewApiToken {
        name: token_name,
        token_hash,
        member_id,
        fee_manager,
    })
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://{}/api/fees/2024/1",
        token_value.bright_yellow(),
        config.listen_addr
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<4} {:<26} {:<12} {:<5} {:<17} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Member".bright_white().bold(),
        "Mgr".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(80).bright_black());

    for token in &tokens {
        let status = if token.is_active() {
            "ACTIVE".green()
        } else {
            "REVOKED".red()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<26} {:<12} {:<5} {:<17} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token.member_id,
            if token.fee_manager { "yes" } else { "-" },
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or numeric ID after confirmation.
///
/// When Redis is configured, the cached principal is dropped as well so the
/// running server stops accepting the token immediately.
async fn revoke_token(
    repo: Arc<PgTokenRepository>,
    config: &Config,
    name_or_id: String,
) -> Result<()> {
    println!("{}", "Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo
            .find_by_id(id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
        Err(_) => repo
            .find_by_name(&name_or_id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
    };

    let token = token.context("Token not found")?;

    if !token.is_active() {
        println!("{}", "This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token:  {}", token.name.cyan());
    println!("  Member: {}", token.member_id.cyan());
    println!("  ID:     {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url).await {
            Ok(cache) => {
                if let Err(e) = cache.invalidate(&token.token_hash).await {
                    println!("{} {}", "Could not clear cached principal:".yellow(), e);
                }
            }
            Err(e) => println!("{} {}", "Redis unreachable, cache entry will expire:".yellow(), e),
        }
    }

    println!();
    println!("{}", "Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

async fn handle_period_action(action: PeriodAction, pool: &PgPool, config: &Config) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let service = FeeService::new(
        Arc::new(PgFeeRepository::new(pool.clone())),
        Arc::new(PgMemberDirectory::new(pool)),
        config.reserved_member_id.clone(),
    );

    match action {
        PeriodAction::Open {
            year,
            semester,
            amount,
        } => {
            let key = PeriodKey::new(year, semester)?;
            let period = service
                .create_period(key, amount)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to open period: {}", e))?;

            println!("{}", "Period opened".green().bold());
            println!("  Period:     {}", period.key().to_string().cyan());
            println!("  Due:        {}", period.amount.to_string().bright_white());
            println!(
                "  Carry-over: {}",
                period.carry_over.to_string().bright_white()
            );
        }
        PeriodAction::Show { year, semester } => {
            let key = PeriodKey::new(year, semester)?;
            let statement = service
                .search(key)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load period: {}", e))?;

            println!("{} {}", "Period".bright_blue().bold(), key.to_string().cyan());
            println!();
            println!(
                "  Carry-over: {}",
                statement.carry_over.to_string().bright_white()
            );
            for log in &statement.logs {
                println!(
                    "  {} {:<8} {:>10}  {}",
                    log.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
                    log.kind.as_str(),
                    log.amount,
                    log.description
                );
            }
            println!(
                "  Total:      {}",
                statement.total.to_string().bright_green().bold()
            );
        }
    }
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let periods: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fee_periods")
                .fetch_one(pool)
                .await?;
            let logs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fee_logs")
                .fetch_one(pool)
                .await?;
            let tokens: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL:    {}", version.bright_white());
            println!("  Periods:       {}", periods.to_string().bright_green().bold());
            println!("  Logs:          {}", logs.to_string().bright_green().bold());
            println!("  Active tokens: {}", tokens.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
