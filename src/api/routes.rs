//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`]. Role checks happen in the handlers.

use crate::api::handlers::{
    amount_handler, create_period_handler, deposit_handler, deptors_handler, exempt_handler,
    pay_handler, payers_handler, search_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST /fees`                                - Open a fee period
/// - `GET  /fees/{year}/{semester}`              - Period statement
/// - `GET  /fees/{year}/{semester}/amount`       - Sum paid by one member
/// - `GET  /fees/{year}/{semester}/payers`       - Members who paid or were exempted
/// - `GET  /fees/{year}/{semester}/deptors`      - Members who still owe
/// - `POST /fees/{year}/{semester}/payments`     - Record payments
/// - `POST /fees/{year}/{semester}/deposits`     - Record a club deposit
/// - `POST /fees/{year}/{semester}/exemptions`   - Exempt a member
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/fees", post(create_period_handler))
        .route("/fees/{year}/{semester}", get(search_handler))
        .route("/fees/{year}/{semester}/amount", get(amount_handler))
        .route("/fees/{year}/{semester}/payers", get(payers_handler))
        .route("/fees/{year}/{semester}/deptors", get(deptors_handler))
        .route("/fees/{year}/{semester}/payments", post(pay_handler))
        .route("/fees/{year}/{semester}/deposits", post(deposit_handler))
        .route("/fees/{year}/{semester}/exemptions", post(exempt_handler))
}
