use crate::api::AppState;
use crate::domain::user::User;
use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// Binds a protected request to its user: parses the bearer access token and
/// loads the user row, failing closed with 401 on any mismatch.
#[derive(Debug)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(header::AUTHORIZATION).ok_or(AppError::InvalidAccessToken)?;
        let value = header.to_str().map_err(|_| AppError::InvalidAccessToken)?;
        let token = value.strip_prefix("Bearer ").ok_or(AppError::InvalidAccessToken)?;

        let user_id = state.auth_service.parse_access(token)?;
        let user = state.user_service.get_by_id(user_id).await.map_err(|_| AppError::InvalidAccessToken)?;

        Ok(Self(user))
    }
}
