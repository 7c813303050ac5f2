//! Periodic removal of expired and revoked refresh tokens.

use std::time::Duration;

use notekeep_db::repositories::RefreshTokenRepo;
use notekeep_db::DbPool;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the refresh-token cleanup loop until `cancel` is triggered.
pub async fn run(pool: DbPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Refresh token cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Refresh token cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                let result = async {
                    let mut conn = pool.acquire().await?;
                    RefreshTokenRepo::cleanup_expired(&mut conn).await
                }
                .await;

                match result {
                    Ok(0) => tracing::debug!("Refresh token cleanup: nothing to delete"),
                    Ok(deleted) => tracing::info!(deleted, "Refresh token cleanup: deleted rows"),
                    Err(e) => tracing::error!(error = %e, "Refresh token cleanup failed"),
                }
            }
        }
    }
}
