//! Handlers for share links.
//!
//! Issuing, listing and revoking links requires owning the note. Consuming a
//! link is public: the token itself is the credential.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use notekeep_core::types::DbId;
use notekeep_db::models::note::SharedNoteView;
use notekeep_db::models::share_token::{CreateShareRequest, CreatedShareToken, ShareTokenView};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::services::note_share;
use crate::state::AppState;
use crate::uow::UnitOfWork;

/// POST /api/notes/{id}/share
///
/// The raw token is only ever returned here.
pub async fn create(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(note_id): Path<DbId>,
    body: Option<Json<CreateShareRequest>>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedShareToken>>)> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let default_ttl = state.config.share_default_ttl();

    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let created = note_share::create(&mut uow, &principal, note_id, input, default_ttl).await?;
    uow.commit(&state).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/notes/{id}/share
pub async fn list_for_note(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(note_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ShareTokenView>>>> {
    let mut conn = state.pool.acquire().await?;
    let tokens = note_share::list_for_note(&mut conn, &principal, note_id).await?;
    Ok(Json(DataResponse { data: tokens }))
}

/// DELETE /api/notes/{id}/share/{token_id}
pub async fn revoke(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path((note_id, token_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    note_share::revoke_for_note(&mut uow, &principal, note_id, token_id).await?;
    uow.commit(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/share/{token}
///
/// Public. One-time links are revoked by this call.
pub async fn consume(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<SharedNoteView>>> {
    let view = note_share::consume(&state.pool, &token).await?;
    Ok(Json(DataResponse { data: view }))
}
