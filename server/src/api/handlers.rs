//! API handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use paysettle_common::{AccountId, Transaction, TransactionId};

use super::error::ApiError;
use super::extract::{JsonBody, PathParam};
use super::models::*;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

fn created<T>(data: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthPayload>> {
    Json(ApiResponse::success(HealthPayload {
        service: "paysettle",
        storage: state.storage.as_str(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Json<ApiResponse<MetricsPayload>> {
    Json(ApiResponse::success(MetricsPayload {
        metrics: state.metrics.snapshot(),
    }))
}

pub async fn register_account(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterAccountRequest>,
) -> Created<AccountPayload> {
    let account = state.accounts.register(req.into()).await?;
    created(AccountPayload {
        account: account.into(),
    })
}

pub async fn get_account(
    State(state): State<AppState>,
    PathParam(id): PathParam<AccountId>,
) -> ApiResult<AccountPayload> {
    let account = state.accounts.get(id).await?;
    ok(AccountPayload {
        account: account.into(),
    })
}

pub async fn update_account(
    State(state): State<AppState>,
    PathParam(id): PathParam<AccountId>,
    JsonBody(req): JsonBody<UpdateBalanceRequest>,
) -> ApiResult<AccountPayload> {
    let account = state
        .accounts
        .update_balance(id, req.balance, req.currency)
        .await?;
    ok(AccountPayload {
        account: account.into(),
    })
}

pub async fn delete_account(
    State(state): State<AppState>,
    PathParam(id): PathParam<AccountId>,
) -> ApiResult<Empty> {
    state.accounts.delete(id).await?;
    ok(Empty {})
}

pub async fn frozen_balance(
    State(state): State<AppState>,
    PathParam(id): PathParam<AccountId>,
) -> ApiResult<FrozenBalancePayload> {
    let frozen_balance = state.settlement.frozen_balance(id).await?;
    ok(FrozenBalancePayload { frozen_balance })
}

pub async fn create_deposit(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<DepositRequest>,
) -> Created<TransactionPayload> {
    let transaction = state.settlement.create_deposit(Transaction::from(req)).await?;
    created(TransactionPayload { transaction })
}

pub async fn create_withdraw(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<WithdrawRequest>,
) -> Created<TransactionPayload> {
    let transaction = state.settlement.create_withdraw(Transaction::from(req)).await?;
    created(TransactionPayload { transaction })
}

pub async fn get_transaction(
    State(state): State<AppState>,
    PathParam(id): PathParam<TransactionId>,
) -> ApiResult<TransactionPayload> {
    let transaction = state.settlement.get(id).await?;
    ok(TransactionPayload { transaction })
}

pub async fn settle_transaction(
    State(state): State<AppState>,
    PathParam(id): PathParam<TransactionId>,
) -> ApiResult<TransactionPayload> {
    let transaction = state.settlement.settle(id).await?;
    ok(TransactionPayload { transaction })
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    PathParam(id): PathParam<TransactionId>,
) -> ApiResult<Empty> {
    state.settlement.delete(id).await?;
    ok(Empty {})
}
