//! Metrics Refresh Task
//!
//! Background task that periodically recomputes the memory estimate and
//! entry-count gauges.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::cache::SharedStore;

/// Spawns a background task that periodically refreshes the size gauges.
///
/// Values the size estimator cannot handle are skipped for that round; a
/// panicking tick is logged and the loop keeps going. The loop exits once
/// `token` is cancelled.
pub fn spawn_metrics_task<V>(
    store: SharedStore<V>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()>
where
    V: Send + 'static,
{
    tokio::spawn(async move {
        debug!("Starting metrics refresh with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Metrics refresh cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let store = Arc::clone(&store);
                    let tick = tokio::spawn(async move { store.lock().await.refresh_metrics() });

                    match tick.await {
                        Ok(0) => debug!("Metrics refresh complete"),
                        Ok(skipped) => {
                            warn!("Metrics refresh: {} values could not be sized", skipped)
                        }
                        Err(err) => error!(error = %err, "Metrics refresh tick failed"),
                    }
                }
            }
        }
    })
}
