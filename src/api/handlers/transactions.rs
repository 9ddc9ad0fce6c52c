//! Session command and transaction API handlers
//!
//! Thin mapping from the session engine's outcomes onto HTTP statuses:
//! a device rejection or a session that never started is 400, a
//! confirmation that never arrived is 409, an unknown charge point is
//! 422. Hard dispatch failures travel on the error channel and map in
//! one place, `dispatch_error_response`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::dto::{
    ApiResponse, SessionAckDto, StartSessionRequest, StartedSessionDto, StopSessionQuery,
    StopSessionRequest, TransactionDto,
};
use crate::api::validated_json::ValidatedJson;
use crate::application::{PollOutcome, SessionSettings, SharedSessionService};
use crate::domain::{DispatchError, TransactionRepository};

/// Session engine state shared by the transaction handlers
#[derive(Clone)]
pub struct SessionAppState {
    pub sessions: SharedSessionService,
    pub transactions: Arc<dyn TransactionRepository>,
    pub settings: SessionSettings,
}

/// Status mapping for the hard dispatch failures.
fn dispatch_error_response<T>(err: DispatchError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = match &err {
        DispatchError::UnknownChargePoint(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DispatchError::UnsupportedProtocol(_) | DispatchError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        DispatchError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ApiResponse::error(err.to_string())))
}

/// Start a charging session
///
/// Dispatches RemoteStartTransaction and blocks until the station
/// acknowledges or the acknowledgement deadline passes. The payload is
/// the station's answer; whether a transaction really opened is a
/// separate question, answered by `POST /api/v1/transactions/active`.
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    tag = "Sessions",
    request_body = StartSessionRequest,
    responses(
        (status = 200, description = "Station acknowledged the command", body = ApiResponse<SessionAckDto>),
        (status = 400, description = "Exchange with the station failed"),
        (status = 409, description = "No acknowledgement within the deadline"),
        (status = 422, description = "Unknown charge point or invalid request body")
    )
)]
pub async fn start_session(
    State(state): State<SessionAppState>,
    ValidatedJson(body): ValidatedJson<StartSessionRequest>,
) -> Result<Json<ApiResponse<SessionAckDto>>, (StatusCode, Json<ApiResponse<SessionAckDto>>)> {
    match state
        .sessions
        .start_session(&body.charge_point_id, body.connector_id, &body.ocpp_id_tag)
        .await
    {
        Ok(PollOutcome::Success(response)) => Ok(Json(ApiResponse::success(SessionAckDto {
            charge_point_id: body.charge_point_id,
            response,
        }))),
        Ok(PollOutcome::Rejected(reason)) => {
            Err((StatusCode::BAD_REQUEST, Json(ApiResponse::error(reason))))
        }
        Ok(PollOutcome::TimedOut) => Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::error(format!(
                "Charge point {} has not answered within {} seconds",
                body.charge_point_id,
                state.settings.ack.deadline.as_secs()
            ))),
        )),
        Err(err) => Err(dispatch_error_response(err)),
    }
}

/// Start a session and wait for the transaction
///
/// Dispatches RemoteStartTransaction and blocks until the station's
/// StartTransaction shows up as a transaction record, then returns the
/// new transaction id. A station can acknowledge the command and still
/// never start (blocked tag, occupied connector); that surfaces as 400.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/active",
    tag = "Sessions",
    request_body = StartSessionRequest,
    responses(
        (status = 200, description = "Transaction opened", body = ApiResponse<StartedSessionDto>),
        (status = 400, description = "No transaction within the deadline"),
        (status = 422, description = "Unknown charge point or invalid request body")
    )
)]
pub async fn await_session_started(
    State(state): State<SessionAppState>,
    ValidatedJson(body): ValidatedJson<StartSessionRequest>,
) -> Result<Json<ApiResponse<StartedSessionDto>>, (StatusCode, Json<ApiResponse<StartedSessionDto>>)>
{
    match state
        .sessions
        .await_session_started(&body.charge_point_id, body.connector_id, &body.ocpp_id_tag)
        .await
    {
        Ok(PollOutcome::Success(transaction_id)) => Ok(Json(ApiResponse::success(
            StartedSessionDto { transaction_id },
        ))),
        Ok(PollOutcome::Rejected(reason)) => {
            Err((StatusCode::BAD_REQUEST, Json(ApiResponse::error(reason))))
        }
        Ok(PollOutcome::TimedOut) => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format!(
                "Transaction has not been started within {} seconds for id tag {} at charge point {}",
                state.settings.start.deadline.as_secs(),
                body.ocpp_id_tag,
                body.charge_point_id
            ))),
        )),
        Err(err) => Err(dispatch_error_response(err)),
    }
}

/// Stop a charging session
///
/// Dispatches RemoteStopTransaction for the given transaction and blocks
/// until the station acknowledges.
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "Sessions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction to stop"),
        StopSessionQuery
    ),
    responses(
        (status = 200, description = "Station acknowledged the command", body = ApiResponse<SessionAckDto>),
        (status = 400, description = "Exchange with the station failed"),
        (status = 409, description = "No acknowledgement within the deadline"),
        (status = 422, description = "Unknown charge point")
    )
)]
pub async fn stop_session(
    State(state): State<SessionAppState>,
    Path(transaction_id): Path<i32>,
    Query(query): Query<StopSessionQuery>,
) -> Result<Json<ApiResponse<SessionAckDto>>, (StatusCode, Json<ApiResponse<SessionAckDto>>)> {
    match state
        .sessions
        .stop_session(&query.charge_point_id, transaction_id)
        .await
    {
        Ok(PollOutcome::Success(response)) => Ok(Json(ApiResponse::success(SessionAckDto {
            charge_point_id: query.charge_point_id,
            response,
        }))),
        Ok(PollOutcome::Rejected(reason)) => {
            Err((StatusCode::BAD_REQUEST, Json(ApiResponse::error(reason))))
        }
        Ok(PollOutcome::TimedOut) => Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::error(format!(
                "Charge point {} has not answered within {} seconds",
                query.charge_point_id,
                state.settings.ack.deadline.as_secs()
            ))),
        )),
        Err(err) => Err(dispatch_error_response(err)),
    }
}

/// Stop a session and wait for the final record
///
/// Dispatches RemoteStopTransaction and blocks until the transaction's
/// stop timestamp is recorded, then returns the closed record including
/// the stop meter value and reason.
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/active/{transaction_id}",
    tag = "Sessions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction to stop"),
        StopSessionQuery
    ),
    responses(
        (status = 200, description = "Transaction closed", body = ApiResponse<TransactionDto>),
        (status = 409, description = "Transaction still open after the deadline"),
        (status = 422, description = "Unknown charge point")
    )
)]
pub async fn await_session_stopped(
    State(state): State<SessionAppState>,
    Path(transaction_id): Path<i32>,
    Query(query): Query<StopSessionQuery>,
) -> Result<Json<ApiResponse<TransactionDto>>, (StatusCode, Json<ApiResponse<TransactionDto>>)> {
    match state
        .sessions
        .await_session_stopped(&query.charge_point_id, transaction_id)
        .await
    {
        Ok(PollOutcome::Success(tx)) => {
            Ok(Json(ApiResponse::success(TransactionDto::from_domain(tx))))
        }
        Ok(PollOutcome::Rejected(reason)) => {
            Err((StatusCode::BAD_REQUEST, Json(ApiResponse::error(reason))))
        }
        Ok(PollOutcome::TimedOut) => Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::error(format!(
                "Transaction {} has not finished within {} seconds",
                transaction_id,
                state.settings.stop.deadline.as_secs()
            ))),
        )),
        Err(err) => Err(dispatch_error_response(err)),
    }
}

/// Stop a session without waiting
///
/// Dispatches RemoteStopTransaction and returns as soon as the command
/// is on its way. The station's answer still lands in the task store.
#[utoipa::path(
    delete,
    path = "/api/v1/transactions",
    tag = "Sessions",
    request_body = StopSessionRequest,
    responses(
        (status = 204, description = "Command dispatched"),
        (status = 422, description = "Unknown charge point or invalid request body"),
        (status = 503, description = "Engine is shutting down")
    )
)]
pub async fn stop_session_detached(
    State(state): State<SessionAppState>,
    ValidatedJson(body): ValidatedJson<StopSessionRequest>,
) -> Result<StatusCode, (StatusCode, Json<ApiResponse<()>>)> {
    match state
        .sessions
        .stop_session_detached(&body.charge_point_id, body.transaction_id)
        .await
    {
        Ok(_task_id) => Ok(StatusCode::NO_CONTENT),
        Err(err) => Err(dispatch_error_response(err)),
    }
}

/// Get a transaction by id
///
/// Returns the full session record: meter values, timestamps and the
/// stop reason once the session has closed.
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "Transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction id")
    ),
    responses(
        (status = 200, description = "Transaction details", body = ApiResponse<TransactionDto>),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn get_transaction(
    State(state): State<SessionAppState>,
    Path(transaction_id): Path<i32>,
) -> Result<Json<ApiResponse<TransactionDto>>, (StatusCode, Json<ApiResponse<TransactionDto>>)> {
    match state.transactions.find_by_id(transaction_id).await {
        Ok(Some(tx)) => Ok(Json(ApiResponse::success(TransactionDto::from_domain(tx)))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!(
                "Transaction {} not found",
                transaction_id
            ))),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )),
    }
}

/// List active transactions
///
/// Returns every session that has not stopped yet, across all charge
/// points. Use this to find the `transaction_id` for a stop command.
#[utoipa::path(
    get,
    path = "/api/v1/transactions/active",
    tag = "Transactions",
    responses(
        (status = 200, description = "Currently running sessions", body = ApiResponse<Vec<TransactionDto>>)
    )
)]
pub async fn list_active_transactions(
    State(state): State<SessionAppState>,
) -> Result<
    Json<ApiResponse<Vec<TransactionDto>>>,
    (StatusCode, Json<ApiResponse<Vec<TransactionDto>>>),
> {
    match state.transactions.find_all_active().await {
        Ok(transactions) => {
            let active: Vec<TransactionDto> = transactions
                .into_iter()
                .map(TransactionDto::from_domain)
                .collect();
            Ok(Json(ApiResponse::success(active)))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )),
    }
}

/// Active transactions for an id tag
#[utoipa::path(
    get,
    path = "/api/v1/tags/{id_tag}/transactions",
    tag = "Transactions",
    params(
        ("id_tag" = String, Path, description = "OCPP id tag")
    ),
    responses(
        (status = 200, description = "Running sessions authorized by this tag", body = ApiResponse<Vec<TransactionDto>>)
    )
)]
pub async fn list_transactions_for_tag(
    State(state): State<SessionAppState>,
    Path(id_tag): Path<String>,
) -> Result<
    Json<ApiResponse<Vec<TransactionDto>>>,
    (StatusCode, Json<ApiResponse<Vec<TransactionDto>>>),
> {
    match state.transactions.find_active_by_id_tag(&id_tag).await {
        Ok(transactions) => {
            let active: Vec<TransactionDto> = transactions
                .into_iter()
                .map(TransactionDto::from_domain)
                .collect();
            Ok(Json(ApiResponse::success(active)))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )),
    }
}

// ── Tests ──────────────────────────────────────────────────────
