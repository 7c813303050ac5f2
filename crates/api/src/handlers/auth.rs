//! Handlers for the `/auth` resource.
//!
//! Login and refresh return the token payload in the body and also set the
//! `AUTH-TOKEN` / `REFRESH-TOKEN` cookies. Refresh and logout accept the
//! refresh token either in the JSON body or from its cookie.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use notekeep_db::models::user::UserResponse;

use crate::auth::cookies::{
    cookie_value, removal_cookie, token_cookie, AUTH_COOKIE, REFRESH_COOKIE,
};
use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::services::auth::{
    self, AuthTokens, ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
};
use crate::state::AppState;

type CookieHeaders = AppendHeaders<[(HeaderName, String); 2]>;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.pool.acquire().await?;
    let tokens = auth::login(&mut conn, &state.config.jwt, input).await?;
    Ok((token_cookies(&state, &tokens), Json(tokens)))
}

/// POST /api/auth/refresh
///
/// Rotates the refresh token. The presented token is unusable afterwards.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> AppResult<impl IntoResponse> {
    let raw = presented_refresh_token(&headers, body).unwrap_or_default();

    let mut tx = state.pool.begin().await?;
    let tokens = auth::refresh(&mut tx, &state.config.jwt, &raw).await?;
    tx.commit().await?;

    Ok((token_cookies(&state, &tokens), Json(tokens)))
}

/// POST /api/auth/logout
///
/// Revokes the presented refresh token, if any, and clears both cookies.
/// Always answers 204.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> AppResult<impl IntoResponse> {
    let raw = presented_refresh_token(&headers, body);

    let mut conn = state.pool.acquire().await?;
    auth::logout(&mut conn, raw.as_deref()).await?;

    let secure = state.config.cookie_secure;
    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (SET_COOKIE, removal_cookie(AUTH_COOKIE, secure)),
            (SET_COOKIE, removal_cookie(REFRESH_COOKIE, secure)),
        ]),
    ))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let user = auth::register(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/auth/me
pub async fn me(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let mut conn = state.pool.acquire().await?;
    let user = auth::me(&mut conn, &principal).await?;
    Ok(Json(DataResponse { data: user }))
}

/// POST /api/auth/change-password
///
/// Signs the user out everywhere: all refresh tokens are revoked.
pub async fn change_password(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let mut tx = state.pool.begin().await?;
    auth::change_password(&mut tx, &principal, input).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn presented_refresh_token(
    headers: &HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Option<String> {
    body.and_then(|Json(b)| b.refresh_token)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| cookie_value(headers, REFRESH_COOKIE))
}

fn token_cookies(state: &AppState, tokens: &AuthTokens) -> CookieHeaders {
    let secure = state.config.cookie_secure;
    AppendHeaders([
        (
            SET_COOKIE,
            token_cookie(AUTH_COOKIE, &tokens.access_token, tokens.expires_in, secure),
        ),
        (
            SET_COOKIE,
            token_cookie(
                REFRESH_COOKIE,
                &tokens.refresh_token,
                tokens.refresh_expires_in,
                secure,
            ),
        ),
    ])
}
