//! Handlers that append logs to a fee period.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::fee::{
    DepositRequest, ExemptRequest, PayRequest, PeriodPath, RecordedLogsResponse,
};
use crate::application::services::MemberPayment;
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// Records dues paid by one or more members.
///
/// # Endpoint
///
/// `POST /api/fees/{year}/{semester}/payments`
///
/// # Request Body
///
/// ```json
/// { "payments": [ { "member_id": "20181681", "amount": 30000 } ] }
/// ```
///
/// The batch is stored all or none.
///
/// # Errors
///
/// - 400 if the batch is empty, too large or holds a negative amount
/// - 403 if the caller does not manage club fees
/// - 404 if the period does not exist
pub async fn pay_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(path): Path<PeriodPath>,
    Json(payload): Json<PayRequest>,
) -> Result<(StatusCode, Json<RecordedLogsResponse>), AppError> {
    principal.require_fee_manager()?;
    let key = path.into_key()?;
    payload.validate()?;

    let payments: Vec<MemberPayment> = payload.payments.into_iter().map(Into::into).collect();
    let logs = state.fee_service.pay(key, payments).await?;

    Ok((StatusCode::CREATED, Json(logs.into())))
}

/// Records club-level income, or an expense when `amount` is negative.
///
/// # Endpoint
///
/// `POST /api/fees/{year}/{semester}/deposits`
///
/// # Errors
///
/// - 400 if the description is empty or too long
/// - 403 if the caller does not manage club fees
/// - 404 if the period does not exist
pub async fn deposit_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(path): Path<PeriodPath>,
    Json(payload): Json<DepositRequest>,
) -> Result<(StatusCode, Json<RecordedLogsResponse>), AppError> {
    principal.require_fee_manager()?;
    let key = path.into_key()?;
    payload.validate()?;

    let log = state
        .fee_service
        .deposit(key, payload.amount, &payload.description)
        .await?;

    Ok((StatusCode::CREATED, Json(vec![log].into())))
}

/// Exempts a member from the period's fee.
///
/// # Endpoint
///
/// `POST /api/fees/{year}/{semester}/exemptions`
///
/// # Errors
///
/// - 403 if the caller does not manage club fees
/// - 404 if the period does not exist
/// - 409 `already_exempted` if the member is already exempted
pub async fn exempt_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(path): Path<PeriodPath>,
    Json(payload): Json<ExemptRequest>,
) -> Result<(StatusCode, Json<RecordedLogsResponse>), AppError> {
    principal.require_fee_manager()?;
    let key = path.into_key()?;
    payload.validate()?;

    let log = state.fee_service.exempt(key, &payload.member_id).await?;

    Ok((StatusCode::CREATED, Json(vec![log].into())))
}
