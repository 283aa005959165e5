use crate::domain::order::Order;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Password must not be empty")]
    InvalidPassword,
    #[error("Refresh token not found")]
    RefreshTokenNotFound,
    #[error("Refresh token is already used")]
    RefreshTokenIsUsed,
    #[error("Refresh token expired")]
    RefreshTokenExpired,
    #[error("Invalid access token")]
    InvalidAccessToken,
    #[error("Invalid order number")]
    OrderNumberInvalid,
    #[error("Order number is taken by another user")]
    OrderNumberTaken,
    /// Carries the pre-existing row so handlers can echo it.
    #[error("Order already exists")]
    OrderAlreadyExists(Box<Order>),
    #[error("Order not found")]
    OrderNotFound,
    #[error("Order is already processed")]
    OrderAlreadyProcessed,
    #[error("Insufficient balance")]
    BalanceInsufficient,
    #[error("Request body decoding failed: {0}")]
    Decoding(String),
    #[error("Request validation failed")]
    Validation(#[from] validator::ValidationErrors),
    #[error("Storage failure")]
    Store(#[from] sqlx::Error),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

const KIND_SERVICE: &str = "service_error";
const KIND_DECODING: &str = "decoding_failed";
const KIND_VALIDATION: &str = "validation_failed";

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, String>>,
}

fn field_reasons(errors: &validator::ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .iter()
        .map(|(name, errs)| {
            let reason = errs.first().map_or_else(
                || "invalid".to_string(),
                |e| e.message.as_ref().map_or_else(|| e.code.to_string(), ToString::to_string),
            );
            ((*name).to_string(), reason)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message, fields) = match &self {
            Self::UserAlreadyExists
            | Self::OrderNumberTaken
            | Self::OrderAlreadyExists(_)
            | Self::OrderAlreadyProcessed => (StatusCode::CONFLICT, KIND_SERVICE, self.to_string(), None),
            Self::UserNotFound
            | Self::RefreshTokenNotFound
            | Self::RefreshTokenIsUsed
            | Self::RefreshTokenExpired
            | Self::InvalidAccessToken => (StatusCode::UNAUTHORIZED, KIND_SERVICE, self.to_string(), None),
            Self::InvalidPassword | Self::OrderNumberInvalid => {
                (StatusCode::UNPROCESSABLE_ENTITY, KIND_SERVICE, self.to_string(), None)
            }
            Self::OrderNotFound => (StatusCode::NOT_FOUND, KIND_SERVICE, self.to_string(), None),
            Self::BalanceInsufficient => (StatusCode::PAYMENT_REQUIRED, KIND_SERVICE, self.to_string(), None),
            Self::Decoding(msg) => (StatusCode::BAD_REQUEST, KIND_DECODING, msg.clone(), None),
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                KIND_VALIDATION,
                self.to_string(),
                Some(field_reasons(errors)),
            ),
            Self::Store(e) => {
                tracing::error!(error = %e, "Storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, KIND_SERVICE, "Internal server error".to_string(), None)
            }
            Self::Internal => {
                tracing::error!("Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, KIND_SERVICE, "Internal server error".to_string(), None)
            }
        };

        (status, Json(ErrorBody { error: kind, message, fields })).into_response()
    }
}
