//! Bearer token authentication for the ledger API.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{domain::entities::Principal, error::AppError, state::AppState};

/// Resolves the caller's Bearer token to a [`Principal`].
///
/// The principal is stored in request extensions, where handlers pick it up
/// with `Extension<Principal>` to decide between member and fee-manager
/// access. Lookups go through the principal cache before the token store.
///
/// # Errors
///
/// `401 Unauthorized` with `WWW-Authenticate: Bearer` when the header is
/// missing or malformed, or the token is unknown or revoked.
pub async fn layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Authorization header is missing or invalid" }),
            )
        })?;

    let principal: Principal = state.auth_service.authenticate(&token).await?;
    tracing::debug!(member_id = %principal.member_id, fee_manager = principal.fee_manager, "Authenticated");
    parts.extensions.insert(principal);

    Ok(next.run(Request::from_parts(parts, body)).await)
}
