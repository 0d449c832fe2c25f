//! HTTP handlers for the four ledger operations plus health.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::core_types::UserId;
use crate::error::LedgerError;
use crate::gateway::state::AppState;
use crate::gateway::types::{error_codes, AmountRequest, ApiResponse};
use crate::model::{PointHistory, UserPoint};

type HandlerError = (StatusCode, Json<ApiResponse<()>>);

/// Map a service error to HTTP status + stable error code.
fn map_error(err: LedgerError) -> HandlerError {
    let (status, code) = match &err {
        LedgerError::NotFound => (StatusCode::NOT_FOUND, error_codes::USER_NOT_FOUND),
        LedgerError::InvalidAmount => (StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER),
        LedgerError::InsufficientFunds { .. } => {
            (StatusCode::BAD_REQUEST, error_codes::INSUFFICIENT_BALANCE)
        }
        LedgerError::LimitExceeded { .. } => {
            (StatusCode::BAD_REQUEST, error_codes::BALANCE_LIMIT_EXCEEDED)
        }
        LedgerError::Store(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
        ),
    };
    (status, Json(ApiResponse::<()>::error(code, err.to_string())))
}

/// An undeserializable body is a client error like any other: it gets the
/// envelope and the invalid-parameter code, not axum's bare 422.
fn map_rejection(rejection: JsonRejection) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(
            error_codes::INVALID_PARAMETER,
            rejection.body_text(),
        )),
    )
}

/// GET /api/v1/point/{user_id}
pub async fn get_point(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ApiResponse<UserPoint>>, HandlerError> {
    match state.service.get_point(user_id).await {
        Ok(row) => Ok(Json(ApiResponse::success(row))),
        Err(e) => Err(map_error(e)),
    }
}

/// GET /api/v1/point/{user_id}/histories
pub async fn get_histories(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ApiResponse<Vec<PointHistory>>>, HandlerError> {
    match state.service.get_histories(user_id).await {
        Ok(entries) => Ok(Json(ApiResponse::success(entries))),
        Err(e) => Err(map_error(e)),
    }
}

/// POST /api/v1/point/{user_id}/charge
pub async fn charge(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    body: Result<Json<AmountRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserPoint>>, HandlerError> {
    let Json(req) = body.map_err(map_rejection)?;
    match state.service.charge(user_id, req.amount).await {
        Ok(row) => Ok(Json(ApiResponse::success(row))),
        Err(e) => Err(map_error(e)),
    }
}

/// POST /api/v1/point/{user_id}/use
pub async fn use_points(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    body: Result<Json<AmountRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserPoint>>, HandlerError> {
    let Json(req) = body.map_err(map_rejection)?;
    match state.service.use_points(user_id, req.amount).await {
        Ok(row) => Ok(Json(ApiResponse::success(row))),
        Err(e) => Err(map_error(e)),
    }
}

/// GET /api/v1/health
pub async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}
