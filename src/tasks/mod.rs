//! Background Tasks Module
//!
//! Periodic maintenance loops owned by each `AdvancedCache`.
//!
//! # Tasks
//! - Expiry sweep: removes expired entries at a fixed interval
//! - Metrics refresh: recomputes the memory estimate and entry-count gauges

mod expiry;
mod metrics;

use std::sync::Mutex;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use expiry::spawn_expiry_task;
pub use metrics::spawn_metrics_task;

// == Maintenance Tasks ==
/// Handles to a cache's background loops.
///
/// Dropping this cancels the loops; `shutdown` also waits for them to exit.
#[derive(Debug)]
pub struct MaintenanceTasks {
    token: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl MaintenanceTasks {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Registers a spawned loop.
    pub fn push(&self, handle: JoinHandle<()>) {
        self.lock_handles().push(handle);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    // == Shutdown ==
    /// Cancels every loop and waits for each to finish.
    pub async fn shutdown(&self) {
        self.token.cancel();

        let handles = std::mem::take(&mut *self.lock_handles());
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "Maintenance task ended abnormally");
            }
        }
        debug!("Maintenance tasks stopped");
    }

    fn lock_handles(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for MaintenanceTasks {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
