//! Route definitions for the `/notes` resource and its sub-resources.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{notes, revisions, share};
use crate::state::AppState;

/// Routes mounted at `/notes`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /trash                             -> list_trash
/// POST   /bulk                              -> bulk
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// PATCH  /{id}                              -> patch
/// DELETE /{id}                              -> soft_delete
/// POST   /{id}/restore                      -> restore
/// DELETE /{id}/permanent                    -> delete_permanently
/// GET    /{id}/revisions                    -> revisions::list
/// GET    /{id}/revisions/{rev}              -> revisions::get_one
/// POST   /{id}/revisions/{rev}/restore      -> revisions::restore
/// POST   /{id}/share                        -> share::create
/// GET    /{id}/share                        -> share::list_for_note
/// DELETE /{id}/share/{token_id}             -> share::revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list).post(notes::create))
        .route("/trash", get(notes::list_trash))
        .route("/bulk", post(notes::bulk))
        .route(
            "/{id}",
            get(notes::get_by_id)
                .put(notes::update)
                .patch(notes::patch)
                .delete(notes::soft_delete),
        )
        .route("/{id}/restore", post(notes::restore))
        .route("/{id}/permanent", delete(notes::delete_permanently))
        .route("/{id}/revisions", get(revisions::list))
        .route("/{id}/revisions/{rev}", get(revisions::get_one))
        .route("/{id}/revisions/{rev}/restore", post(revisions::restore))
        .route("/{id}/share", post(share::create).get(share::list_for_note))
        .route("/{id}/share/{token_id}", delete(share::revoke))
}
