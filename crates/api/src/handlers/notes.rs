//! Handlers for the `/notes` resource: listing, CRUD, trash and bulk actions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use notekeep_core::access::Principal;
use notekeep_core::lifecycle::BulkResult;
use notekeep_core::note_filter::Visibility;
use notekeep_core::paging::Page;
use notekeep_core::types::DbId;
use notekeep_db::models::note::{BulkRequest, NotePatchRequest, NoteRequest, NoteView};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::query::NoteListParams;
use crate::response::DataResponse;
use crate::services::{note_command, note_query};
use crate::state::AppState;
use crate::uow::UnitOfWork;

/// GET /api/notes
///
/// The caller's active notes, filtered by `search`, `color`, `pinned`, `tag`.
pub async fn list(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<NoteListParams>,
) -> AppResult<Json<DataResponse<Page<NoteView>>>> {
    list_visible(&state, &principal, Visibility::Active, params).await
}

/// GET /api/notes/trash
pub async fn list_trash(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<NoteListParams>,
) -> AppResult<Json<DataResponse<Page<NoteView>>>> {
    list_visible(&state, &principal, Visibility::Trashed, params).await
}

/// GET /api/notes/{id}
pub async fn get_by_id(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NoteView>>> {
    let mut conn = state.pool.acquire().await?;
    let view = note_query::find_by_id_for_user(&mut conn, &state.note_cache, &principal, id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/notes
pub async fn create(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<NoteRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<NoteView>>)> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let view = note_command::create(&mut uow, &principal, input).await?;
    uow.commit(&state).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// PUT /api/notes/{id}
///
/// Full replacement of the editable fields, including the tag set.
pub async fn update(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<NoteRequest>,
) -> AppResult<Json<DataResponse<NoteView>>> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let view = note_command::update(&mut uow, &principal, id, input).await?;
    uow.commit(&state).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PATCH /api/notes/{id}
///
/// Only the fields present in the body change.
pub async fn patch(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<NotePatchRequest>,
) -> AppResult<Json<DataResponse<NoteView>>> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let view = note_command::patch(&mut uow, &principal, id, input).await?;
    uow.commit(&state).await?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/notes/{id}
///
/// Moves the note to the trash.
pub async fn soft_delete(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    note_command::soft_delete(&mut uow, &principal, id).await?;
    uow.commit(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/notes/{id}/restore
pub async fn restore(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NoteView>>> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let view = note_command::restore(&mut uow, &principal, id).await?;
    uow.commit(&state).await?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/notes/{id}/permanent
///
/// Only trashed notes can be purged; active ones answer 422.
pub async fn delete_permanently(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    note_command::delete_permanently(&mut uow, &principal, id).await?;
    uow.commit(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/notes/bulk
pub async fn bulk(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<BulkRequest>,
) -> AppResult<Json<DataResponse<BulkResult>>> {
    let mut uow = UnitOfWork::begin(&state.pool).await?;
    let result = note_command::bulk(&mut uow, &principal, input).await?;
    uow.commit(&state).await?;
    Ok(Json(DataResponse { data: result }))
}

async fn list_visible(
    state: &AppState,
    principal: &Principal,
    visibility: Visibility,
    params: NoteListParams,
) -> AppResult<Json<DataResponse<Page<NoteView>>>> {
    let sort = params.sort()?;
    let mut conn = state.pool.acquire().await?;
    let page = note_query::list_own(
        &mut conn,
        principal,
        visibility,
        &params.criteria(),
        sort,
        params.page_request(),
    )
    .await?;
    Ok(Json(DataResponse { data: page }))
}
