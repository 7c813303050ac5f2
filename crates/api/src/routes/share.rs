//! Route definitions for the public `/share` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::share;
use crate::state::AppState;

/// Routes mounted at `/share`.
///
/// ```text
/// GET /{token}  -> consume (no login)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{token}", get(share::consume))
}
