//! Wallet handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use uuid::Uuid;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResponse, ApiResult, ChangeBalanceRequest, ok};
use crate::wallet::{BalanceView, WalletList};

/// Deposit to or withdraw from a wallet
#[utoipa::path(
    post,
    path = "/api/v1/wallet",
    request_body = ChangeBalanceRequest,
    responses(
        (status = 200, description = "Balance changed"),
        (status = 400, description = "Invalid amount or operation type, or not enough balance"),
        (status = 404, description = "Wallet not found"),
        (status = 422, description = "Malformed request body"),
        (status = 500, description = "Storage failure or sustained contention"),
        (status = 504, description = "Request deadline exceeded")
    ),
    tag = "Wallet"
)]
pub async fn change_balance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChangeBalanceRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(req) = payload.map_err(|e| ApiError::unprocessable(e.body_text()))?;
    state.service.change_balance(req.into()).await?;
    Ok(Json(ApiResponse::ok()))
}

/// Get the balance of one wallet
#[utoipa::path(
    get,
    path = "/api/v1/wallets/{wallet_id}",
    params(("wallet_id" = String, Path, description = "Wallet UUID")),
    responses(
        (status = 200, description = "Current balance", body = BalanceView),
        (status = 400, description = "Malformed wallet id"),
        (status = 404, description = "Wallet not found"),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Request deadline exceeded")
    ),
    tag = "Wallet"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(wallet_id): Path<String>,
) -> ApiResult<BalanceView> {
    let wallet_id =
        Uuid::parse_str(&wallet_id).map_err(|_| ApiError::bad_request("incorrect wallet id"))?;
    ok(state.service.get_balance(wallet_id).await?)
}

/// List wallet ids
#[utoipa::path(
    get,
    path = "/api/v1/wallets",
    responses(
        (status = 200, description = "All wallet ids", body = WalletList),
        (status = 500, description = "Storage failure"),
        (status = 504, description = "Request deadline exceeded")
    ),
    tag = "Wallet"
)]
pub async fn list_wallets(State(state): State<Arc<AppState>>) -> ApiResult<WalletList> {
    ok(state.service.list_wallets().await?)
}
