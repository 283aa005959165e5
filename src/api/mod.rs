use crate::Services;
use crate::error::{AppError, Result};
use crate::services::{AuthService, OrderService, UserService};
use axum::extract::rejection::JsonRejection;
use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod balance;
pub mod middleware;
pub mod orders;
pub mod schemas;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub order_service: OrderService,
}

impl From<Services> for AppState {
    fn from(services: Services) -> Self {
        Self {
            auth_service: services.auth_service,
            user_service: services.user_service,
            order_service: services.order_service,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/api/user/register", post(auth::register))
        .route("/api/user/login", post(auth::login))
        .route("/api/user/refresh", post(auth::refresh))
        .route("/api/user/orders", post(orders::upload_order).get(orders::list_orders))
        .route("/api/user/balance", get(balance::get_balance))
        .route("/api/user/balance/withdraw", post(balance::withdraw))
        .route("/api/user/balance/withdrawals", get(balance::list_withdrawals))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unwraps a JSON body, mapping axum's rejection to the 400
/// `decoding_failed` envelope.
pub(crate) fn decode_json<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::Decoding(rejection.body_text())),
    }
}
