//! Handlers for the `/tags` resource.

use axum::extract::{Query, State};
use axum::Json;
use notekeep_db::models::tag::{TagSuggestParams, TagUsage};
use notekeep_db::repositories::TagRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/tags/suggest?prefix=&limit=
///
/// Tag names starting with `prefix` used on the caller's active notes.
/// Admins get suggestions across all tags.
pub async fn suggest(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<TagSuggestParams>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let owner = (!principal.is_admin()).then_some(principal.username.as_str());
    let prefix = params.prefix.trim().to_lowercase();

    let mut conn = state.pool.acquire().await?;
    let names = TagRepo::suggest(&mut conn, &prefix, owner, params.limit()).await?;
    Ok(Json(DataResponse { data: names }))
}

/// GET /api/tags
///
/// The caller's tags with the number of active notes carrying each.
pub async fn list(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<TagUsage>>>> {
    let mut conn = state.pool.acquire().await?;
    let tags = TagRepo::list_with_usage(&mut conn, Some(&principal.username)).await?;
    Ok(Json(DataResponse { data: tags }))
}
