//! In-process LRU cache of note views.
//!
//! Entries are keyed by entity name and id. Reads come from the request path;
//! evictions come from after-commit effects of the unit of work, so a rolled
//! back transaction never touches the cache.
//!
//! A reader that misses takes a [`FillTicket`] before loading the row and
//! hands it back with the loaded view. Any eviction in between invalidates
//! the ticket, so a view read before a concurrent commit is never cached
//! after that commit's eviction has run.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use notekeep_core::types::DbId;
use notekeep_db::models::note::NoteView;

/// Entity name used in cache keys for notes.
pub const NOTE_ENTITY: &str = "Note";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    entity: &'static str,
    id: DbId,
}

impl CacheKey {
    fn note(id: DbId) -> Self {
        Self {
            entity: NOTE_ENTITY,
            id,
        }
    }
}

struct Inner {
    entries: LruCache<CacheKey, NoteView>,
    /// Bumped by every eviction.
    generation: u64,
}

/// Eviction generation observed before a cache-miss load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTicket(u64);

/// Thread-safe LRU of [`NoteView`]s. A capacity of zero disables caching.
pub struct NoteCache {
    inner: Option<Mutex<Inner>>,
}

impl NoteCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|cap| {
                Mutex::new(Inner {
                    entries: LruCache::new(cap),
                    generation: 0,
                })
            }),
        }
    }

    /// Cached view of note `id`, if present.
    pub fn get(&self, id: DbId) -> Option<NoteView> {
        let mut cache = self.inner.as_ref()?.lock().ok()?;
        cache.entries.get(&CacheKey::note(id)).cloned()
    }

    /// Take a ticket before loading a note from the database.
    pub fn ticket(&self) -> FillTicket {
        let generation = self
            .inner
            .as_ref()
            .and_then(|m| m.lock().ok())
            .map_or(0, |c| c.generation);
        FillTicket(generation)
    }

    /// Cache `view` unless an eviction ran since `ticket` was taken or a
    /// newer version is already cached. Returns whether the view was stored.
    pub fn fill(&self, ticket: FillTicket, view: NoteView) -> bool {
        let Some(Ok(mut cache)) = self.inner.as_ref().map(Mutex::lock) else {
            return false;
        };
        if cache.generation != ticket.0 {
            tracing::debug!(entity = NOTE_ENTITY, id = view.id, "Skipped stale cache fill");
            return false;
        }
        let key = CacheKey::note(view.id);
        if cache.entries.peek(&key).is_some_and(|c| c.version >= view.version) {
            return false;
        }
        cache.entries.put(key, view);
        true
    }

    pub fn evict(&self, id: DbId) {
        if let Some(Ok(mut cache)) = self.inner.as_ref().map(Mutex::lock) {
            cache.generation = cache.generation.wrapping_add(1);
            if cache.entries.pop(&CacheKey::note(id)).is_some() {
                tracing::debug!(entity = NOTE_ENTITY, id, "Evicted cache entry");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .as_ref()
            .and_then(|m| m.lock().ok())
            .map_or(0, |c| c.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
