use crate::api::middleware::CurrentUser;
use crate::api::schemas::balance::{BalanceResponse, WithdrawRequest, WithdrawalResponse};
use crate::api::{AppState, decode_json};
use crate::error::Result;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use validator::Validate;

pub async fn get_balance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<BalanceResponse>> {
    let balance = state.user_service.get_balance(user.id).await?;
    Ok(Json(balance.into()))
}

pub async fn withdraw(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: std::result::Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>> {
    let request = decode_json(payload)?;
    request.validate()?;

    let balance = state.user_service.withdraw(user.id, &request.order, request.sum).await?;
    Ok(Json(balance.into()))
}

pub async fn list_withdrawals(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Response> {
    let withdrawals = state.user_service.get_withdrawals(user.id).await?;
    if withdrawals.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<WithdrawalResponse> = withdrawals.into_iter().map(Into::into).collect();
    Ok(Json(body).into_response())
}
