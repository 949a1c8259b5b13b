//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{AuthService, FeeService};
use crate::domain::repositories::{FeeRepository, MemberDirectory, TokenRepository};
use crate::infrastructure::cache::CacheService;

/// Fee service over type-erased stores, so one router serves any backend.
pub type DynFeeService = FeeService<dyn FeeRepository, dyn MemberDirectory>;

pub type DynAuthService = AuthService<dyn TokenRepository>;

#[derive(Clone)]
pub struct AppState {
    pub fee_service: Arc<DynFeeService>,
    pub auth_service: Arc<DynAuthService>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(
        fee_service: Arc<DynFeeService>,
        auth_service: Arc<DynAuthService>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            fee_service,
            auth_service,
            cache,
        }
    }
}
