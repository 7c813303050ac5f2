//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use notekeep_core::access::Principal;
use notekeep_core::error::CoreError;

use crate::auth::cookies::bearer_token;
use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller of a request.
///
/// The token comes from `Authorization: Bearer <token>` or, failing that, the
/// `AUTH-TOKEN` cookie.
///
/// ```ignore
/// async fn my_handler(AuthUser(principal): AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user = %principal.username, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing bearer token or auth cookie".into(),
            ))
        })?;

        let claims = validate_token(&token, &state.config.jwt)
            .map_err(|_| AppError::Core(CoreError::invalid_bearer_token()))?;

        Ok(AuthUser(claims.into_principal()))
    }
}
