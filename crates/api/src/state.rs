use std::sync::Arc;

use crate::background::tag_janitor::TagJanitor;
use crate::cache::NoteCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: notekeep_db::DbPool,
    /// Server configuration (JWT settings, cookie flags, share TTL).
    pub config: Arc<ServerConfig>,
    /// Read-through cache of note views.
    pub note_cache: Arc<NoteCache>,
    /// Handle to the background orphan-tag cleanup worker.
    pub tag_janitor: TagJanitor,
}
