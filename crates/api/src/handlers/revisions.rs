//! Handlers for `/notes/{id}/revisions`.

use axum::extract::{Path, Query, State};
use axum::Json;
use notekeep_core::paging::Page;
use notekeep_core::types::DbId;
use notekeep_db::models::note::NoteView;
use notekeep_db::models::revision::RevisionView;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::services::note_revision;
use crate::state::AppState;
use crate::uow::UnitOfWork;

/// GET /api/notes/{id}/revisions
///
/// Newest revision first.
pub async fn list(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(note_id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<Page<RevisionView>>>> {
    let mut conn = state.pool.acquire().await?;
    let page =
        note_revision::find_revisions(&mut conn, &principal, note_id, params.page_request())
            .await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/notes/{id}/revisions/{rev}
pub async fn get_one(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path((note_id, rev)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<RevisionView>>> {
    let mut conn = state.pool.acquire().await?;
    let revision = note_revision::find_revision(&mut conn, &principal, note_id, rev).await?;
    Ok(Json(DataResponse { data: revision }))
}

/// POST /api/notes/{id}/revisions/{rev}/restore
pub async fn restore(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path((note_id, rev)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<NoteView>>> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let view = note_revision::restore_revision(&mut uow, &principal, note_id, rev).await?;
    uow.commit(&state).await?;
    Ok(Json(DataResponse { data: view }))
}
