//! Handlers for per-member ledger reports.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::api::dto::fee::{
    AmountQuery, AmountResponse, DeptorItem, DeptorsResponse, PayersResponse, PeriodPath,
};
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// Sum a member paid in a period.
///
/// # Endpoint
///
/// `GET /api/fees/{year}/{semester}/amount?member_id=20181681`
///
/// Without `member_id` the caller's own sum is returned. Members may only read
/// their own sum.
///
/// # Errors
///
/// - 403 if another member's sum is requested without the fee role
/// - 404 if the period does not exist
pub async fn amount_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(path): Path<PeriodPath>,
    Query(query): Query<AmountQuery>,
) -> Result<Json<AmountResponse>, AppError> {
    let key = path.into_key()?;
    query.validate()?;

    let member_id = query
        .member_id
        .unwrap_or_else(|| principal.member_id.clone());
    principal.require_self_or_fee_manager(&member_id)?;

    let sum = state.fee_service.amount(key, &member_id).await?;

    Ok(Json(AmountResponse { member_id, sum }))
}

/// Members who paid the due amount or were exempted.
///
/// # Endpoint
///
/// `GET /api/fees/{year}/{semester}/payers`
///
/// # Errors
///
/// - 403 if the caller does not manage club fees
/// - 404 if the period does not exist
pub async fn payers_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(path): Path<PeriodPath>,
) -> Result<Json<PayersResponse>, AppError> {
    principal.require_fee_manager()?;
    let key = path.into_key()?;

    let payers = state.fee_service.payers(key).await?;

    Ok(Json(PayersResponse {
        payers: payers.into_iter().map(Into::into).collect(),
    }))
}

/// Billable members who still owe, with the outstanding amount as `dept`.
///
/// # Endpoint
///
/// `GET /api/fees/{year}/{semester}/deptors`
///
/// # Response
///
/// ```json
/// {
///   "deptors": [
///     { "id": "20181681", "name": "Kim", "department": "CS", "attendance": "attending", "dept": 20000 }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - 403 if the caller does not manage club fees
/// - 404 if the period does not exist
pub async fn deptors_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(path): Path<PeriodPath>,
) -> Result<Json<DeptorsResponse>, AppError> {
    principal.require_fee_manager()?;
    let key = path.into_key()?;

    let deptors = state.fee_service.deptors(key).await?;

    Ok(Json(DeptorsResponse {
        deptors: deptors.into_iter().map(DeptorItem::from).collect(),
    }))
}
