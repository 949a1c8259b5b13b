//! Handlers for opening and reading fee periods.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::fee::{CreatePeriodRequest, PeriodPath, PeriodResponse, SearchResponse};
use crate::domain::entities::{PeriodKey, Principal};
use crate::error::AppError;
use crate::state::AppState;

/// Opens a fee period.
///
/// # Endpoint
///
/// `POST /api/fees`
///
/// # Request Body
///
/// ```json
/// { "year": 2024, "semester": 1, "amount": 30000 }
/// ```
///
/// The opening carry-over is the closing total of the previous semester.
///
/// # Errors
///
/// - 400 if validation fails
/// - 403 if the caller does not manage club fees
/// - 409 `duplicate_period` if the period already exists
pub async fn create_period_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreatePeriodRequest>,
) -> Result<(StatusCode, Json<PeriodResponse>), AppError> {
    principal.require_fee_manager()?;
    payload.validate()?;

    let key = PeriodKey::new(payload.year, payload.semester)?;
    let period = state.fee_service.create_period(key, payload.amount).await?;

    Ok((StatusCode::CREATED, Json(period.into())))
}

/// Returns the cash statement of a period.
///
/// # Endpoint
///
/// `GET /api/fees/{year}/{semester}`
///
/// # Response
///
/// ```json
/// {
///   "carry_over": 12000,
///   "logs": [
///     { "description": "Club fee payment", "amount": 30000, "type": "payment", "created_at": "..." }
///   ],
///   "total": 42000
/// }
/// ```
///
/// A period that was never opened returns zeros and no logs.
pub async fn search_handler(
    State(state): State<AppState>,
    Path(path): Path<PeriodPath>,
) -> Result<Json<SearchResponse>, AppError> {
    let key = path.into_key()?;
    let statement = state.fee_service.search(key).await?;

    Ok(Json(statement.into()))
}
