//! Request-scoped unit of work.
//!
//! A [`UnitOfWork`] owns one database transaction plus the side effects that
//! must only happen once that transaction is durable: cache evictions and
//! orphan-tag sweeps. Services record effects with [`UnitOfWork::defer`]; the
//! handler calls [`UnitOfWork::commit`]. Dropping an uncommitted unit rolls
//! the transaction back and discards its effects.

use notekeep_core::types::DbId;
use sqlx::{PgConnection, Postgres, Transaction};

use crate::state::AppState;

/// Work to run after a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Drop the cached view of a note.
    EvictNote(DbId),
    /// Ask the tag janitor for an orphan sweep.
    PurgeOrphanTags,
}

pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
    effects: Vec<Effect>,
}

impl UnitOfWork {
    /// Begin a transaction on a pooled connection.
    pub async fn begin(pool: &notekeep_db::DbPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
            effects: Vec::new(),
        })
    }

    /// The transaction's connection, for repository calls.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut *self.tx
    }

    /// Queue an effect. Duplicates are collapsed.
    pub fn defer(&mut self, effect: Effect) {
        push_unique(&mut self.effects, effect);
    }

    /// Commit, then run the deferred effects against `state`.
    pub async fn commit(self, state: &AppState) -> Result<(), sqlx::Error> {
        let UnitOfWork { tx, effects } = self;
        tx.commit().await?;

        for effect in effects {
            match effect {
                Effect::EvictNote(id) => state.note_cache.evict(id),
                Effect::PurgeOrphanTags => state.tag_janitor.schedule(),
            }
        }
        Ok(())
    }
}

fn push_unique(effects: &mut Vec<Effect>, effect: Effect) {
    if !effects.contains(&effect) {
        effects.push(effect);
    }
}
