//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cache::SharedStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// Each tick locks the store and calls `cleanup_expired`. A tick runs as its
/// own task, so a panic inside it is logged and the loop carries on with the
/// next tick. The loop exits once `token` is cancelled.
///
/// # Arguments
/// * `store` - Shared reference to the cache store
/// * `interval` - Time between sweeps
/// * `token` - Cancellation token owned by the cache handle
pub fn spawn_expiry_task<V>(
    store: SharedStore<V>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()>
where
    V: Send + 'static,
{
    tokio::spawn(async move {
        info!("Starting expiry sweep with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Expiry sweep cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let store = Arc::clone(&store);
                    let tick = tokio::spawn(async move { store.lock().await.cleanup_expired() });

                    match tick.await {
                        Ok(0) => debug!("Expiry sweep: no expired entries found"),
                        Ok(removed) => info!("Expiry sweep: removed {} expired entries", removed),
                        Err(err) => error!(error = %err, "Expiry sweep tick failed"),
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    use crate::cache::CacheStore;
    use crate::config::CacheConfig;

    fn shared_store() -> SharedStore<String> {
        Arc::new(Mutex::new(CacheStore::new(CacheConfig::new(100)).unwrap()))
    }

    #[tokio::test]
    async fn test_expiry_task_removes_expired_entries() {
        let store = shared_store();
        store
            .lock()
            .await
            .put(
                "expire_soon".to_string(),
                "value".to_string(),
                Some(Duration::from_millis(50)),
                1.0,
            )
            .unwrap();

        let token = CancellationToken::new();
        let handle = spawn_expiry_task(store.clone(), Duration::from_millis(100), token.clone());

        tokio::time::sleep(Duration::from_millis(350)).await;

        {
            let guard = store.lock().await;
            assert!(guard.is_empty(), "Expired entry should have been swept");
            assert_eq!(guard.metrics().evictions, 1);
        }

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_expiry_task_preserves_valid_entries() {
        let store = shared_store();
        store
            .lock()
            .await
            .put(
                "long_lived".to_string(),
                "value".to_string(),
                Some(Duration::from_secs(3600)),
                1.0,
            )
            .unwrap();

        let token = CancellationToken::new();
        let handle = spawn_expiry_task(store.clone(), Duration::from_millis(50), token.clone());

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(
            store.lock().await.get("long_lived"),
            Some("value".to_string())
        );

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_expiry_task_stops_on_cancel() {
        let token = CancellationToken::new();
        let handle = spawn_expiry_task(shared_store(), Duration::from_secs(60), token.clone());

        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("task should stop promptly after cancel")
            .unwrap();
    }
}
