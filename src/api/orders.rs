use crate::adapters::database::order_repo::OrderFilter;
use crate::api::AppState;
use crate::api::middleware::CurrentUser;
use crate::api::schemas::orders::OrderResponse;
use crate::error::{AppError, Result};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Raw-text order number bodies are capped well below any real order number.
const MAX_ORDER_BODY_BYTES: usize = 512;

pub async fn upload_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: String,
) -> Result<Response> {
    if body.len() > MAX_ORDER_BODY_BYTES {
        return Err(AppError::Decoding("order number body exceeds 512 bytes".to_string()));
    }
    let number = body.trim();
    if number.is_empty() {
        return Err(AppError::OrderNumberInvalid);
    }

    match state.order_service.create_order(number, user.id).await {
        Ok(order) => Ok((StatusCode::ACCEPTED, Json(OrderResponse::from(order))).into_response()),
        Err(AppError::OrderAlreadyExists(existing)) => {
            Ok((StatusCode::OK, Json(OrderResponse::from(*existing))).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn list_orders(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Response> {
    let orders = state.order_service.list_orders(&OrderFilter::for_user(user.id)).await?;
    if orders.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(Json(body).into_response())
}
