#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;

use club_ledger::application::services::{AuthService, FeeService};
use club_ledger::domain::entities::{Attendance, Member};
use club_ledger::domain::repositories::{
    FeeRepository, MemberDirectory, NewApiToken, TokenRepository,
};
use club_ledger::infrastructure::cache::MemoryCache;
use club_ledger::infrastructure::memory::{
    MemoryFeeRepository, MemoryMemberDirectory, MemoryTokenRepository,
};
use club_ledger::routes::api_router;
use club_ledger::state::AppState;
use club_ledger::utils::token::{generate_token, hash_token};

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const RESERVED_MEMBER: &str = "MASTER";

/// Memory-backed application state plus handles to seed its stores.
pub struct TestContext {
    pub state: AppState,
    pub members: Arc<MemoryMemberDirectory>,
    pub tokens: Arc<MemoryTokenRepository>,
}

pub fn create_test_state() -> TestContext {
    let fee_repo: Arc<dyn FeeRepository> = Arc::new(MemoryFeeRepository::new());
    let members = Arc::new(MemoryMemberDirectory::new());
    let tokens = Arc::new(MemoryTokenRepository::new());
    let cache = Arc::new(MemoryCache::new());

    let fee_service = Arc::new(FeeService::new(
        fee_repo,
        members.clone() as Arc<dyn MemberDirectory>,
        RESERVED_MEMBER,
    ));
    let auth_service = Arc::new(AuthService::new(
        tokens.clone() as Arc<dyn TokenRepository>,
        cache.clone(),
        SIGNING_SECRET.to_string(),
        Duration::from_secs(60),
    ));

    TestContext {
        state: AppState::new(fee_service, auth_service, cache),
        members,
        tokens,
    }
}

/// Adds approved, attending members.
pub async fn seed_members(ctx: &TestContext, ids: &[&str]) {
    for id in ids {
        ctx.members
            .upsert(Member::new(*id, format!("Member {id}"), "CS"))
            .await;
    }
}

pub async fn seed_graduate(ctx: &TestContext, id: &str) {
    let mut member = Member::new(id, format!("Member {id}"), "CS");
    member.attendance = Attendance::Graduated;
    ctx.members.upsert(member).await;
}

/// Issues a token for `member_id` and returns the raw value.
pub async fn issue_token(ctx: &TestContext, member_id: &str, fee_manager: bool) -> String {
    let token = generate_token().unwrap();
    ctx.tokens
        .create_token(NewApiToken {
            name: format!("{member_id}-{fee_manager}"),
            token_hash: hash_token(SIGNING_SECRET, &token),
            member_id: member_id.to_string(),
            fee_manager,
        })
        .await
        .unwrap();
    token
}

pub fn make_server(ctx: &TestContext) -> TestServer {
    TestServer::new(api_router(ctx.state.clone())).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
