use crate::api::schemas::auth::{Credentials, SessionMessage};
use crate::api::{AppState, decode_json};
use crate::domain::auth::TokenPair;
use crate::error::{AppError, Result};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::time::Duration;
use validator::Validate;

pub(crate) const REFRESH_COOKIE: &str = "refreshtoken";

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let credentials = decode_json(payload)?;
    credentials.validate()?;

    let user = state.user_service.create_user(&credentials.login, &credentials.password).await?;
    let pair = state.auth_service.generate_pair(&user).await?;

    Ok(session_response(jar, pair, state.auth_service.refresh_ttl(), "User registered"))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let credentials = decode_json(payload)?;
    credentials.validate()?;

    let user = state.user_service.login(&credentials.login, &credentials.password).await?;
    let pair = state.auth_service.generate_pair(&user).await?;

    Ok(session_response(jar, pair, state.auth_service.refresh_ttl(), "Logged in"))
}

/// Exchanges the refresh cookie for a fresh pair. Unknown and already-used
/// tokens are indistinguishable to the caller; replays are still logged.
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse> {
    let cookie = jar.get(REFRESH_COOKIE).ok_or(AppError::RefreshTokenNotFound)?;

    let consumed = match state.auth_service.use_refresh(cookie.value()).await {
        Ok(token) => token,
        Err(AppError::RefreshTokenIsUsed) => {
            tracing::warn!("Replayed refresh token rejected");
            return Err(AppError::RefreshTokenNotFound);
        }
        Err(e) => return Err(e),
    };

    let user = state.user_service.get_by_id(consumed.user_id).await?;
    let pair = state.auth_service.generate_pair(&user).await?;

    Ok(session_response(jar, pair, state.auth_service.refresh_ttl(), "Tokens refreshed"))
}

/// Writes the pair to its two transports: the access JWT in the
/// `Authorization` header, the refresh token in an `HttpOnly` cookie.
fn session_response(jar: CookieJar, pair: TokenPair, refresh_ttl: Duration, message: &'static str) -> impl IntoResponse {
    let max_age = time::Duration::try_from(refresh_ttl).unwrap_or(time::Duration::ZERO);
    let cookie = Cookie::build((REFRESH_COOKIE, pair.refresh.value))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Strict)
        .max_age(max_age)
        .build();

    (
        jar.add(cookie),
        AppendHeaders([(header::AUTHORIZATION, format!("Bearer {}", pair.access.value))]),
        Json(SessionMessage { message }),
    )
}
