//! Route definitions for the `/tags` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::tags;
use crate::state::AppState;

/// Routes mounted at `/tags`.
///
/// ```text
/// GET /         -> list
/// GET /suggest  -> suggest (?prefix=&limit=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tags::list))
        .route("/suggest", get(tags::suggest))
}
