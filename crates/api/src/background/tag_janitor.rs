//! Fire-and-forget orphan tag cleanup.
//!
//! Callers signal the janitor through an unbounded channel and never wait for
//! the outcome. The worker drains every pending signal before each run, so a
//! burst of deletions costs one `DELETE`.

use notekeep_db::repositories::TagRepo;
use notekeep_db::DbPool;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle used to request an orphan sweep. Cheap to clone.
#[derive(Clone)]
pub struct TagJanitor {
    tx: mpsc::UnboundedSender<()>,
}

impl TagJanitor {
    /// Spawn the worker on the current runtime. It runs until `cancel` fires
    /// or every handle has been dropped.
    pub fn start(pool: DbPool, cancel: CancellationToken) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(pool, rx, cancel));
        (Self { tx }, handle)
    }

    /// Request an orphan sweep. Never blocks and never fails the caller.
    pub fn schedule(&self) {
        if self.tx.send(()).is_err() {
            tracing::warn!("Tag janitor is not running, orphan cleanup skipped");
        }
    }
}

async fn run(pool: DbPool, mut rx: mpsc::UnboundedReceiver<()>, cancel: CancellationToken) {
    tracing::info!("Tag janitor started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Tag janitor stopping");
                break;
            }
            signal = rx.recv() => {
                if signal.is_none() {
                    tracing::info!("Tag janitor channel closed");
                    break;
                }
                let coalesced = drain(&mut rx);
                sweep(&pool, coalesced + 1).await;
            }
        }
    }
}

/// Discard queued signals, returning how many there were.
fn drain(rx: &mut mpsc::UnboundedReceiver<()>) -> usize {
    let mut count = 0;
    while rx.try_recv().is_ok() {
        count += 1;
    }
    count
}

async fn sweep(pool: &DbPool, signals: usize) {
    let result = async {
        let mut conn = pool.acquire().await?;
        TagRepo::delete_orphans(&mut conn).await
    }
    .await;

    match result {
        Ok(0) => tracing::debug!(signals, "Tag janitor: no orphan tags"),
        Ok(deleted) => tracing::info!(deleted, signals, "Tag janitor: purged orphan tags"),
        Err(e) => tracing::error!(error = %e, "Tag janitor: orphan cleanup failed"),
    }
}
