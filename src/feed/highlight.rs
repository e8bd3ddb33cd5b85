//! Highlight expiry.
//!
//! The reducer only produces highlight maps; when they disappear is decided
//! here, behind `HighlightExpiry`, so a per-token policy can replace the
//! coarse global timer without touching the merge logic.

use crate::feed::types::SharedHighlights;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Schedules the disappearance of highlight maps.
pub trait HighlightExpiry: Send + Sync {
    /// Arrange for `highlights` to be cleared later.
    fn schedule_clear(&self, highlights: SharedHighlights);
    /// Drop every clear that has not fired yet.
    fn cancel_clear(&self);
}

/// Clears the entire map a fixed delay after each batch.
///
/// A newer batch does not cancel an earlier pending clear, so highlights
/// from back-to-back batches can vanish before their own delay has passed.
pub struct GlobalClearTimer {
    delay: Duration,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl GlobalClearTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Number of clears scheduled but not yet fired.
    pub fn pending_count(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|handle| !handle.is_finished());
        pending.len()
    }
}

impl HighlightExpiry for GlobalClearTimer {
    fn schedule_clear(&self, highlights: SharedHighlights) {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut map = highlights.write().await;
            if !map.is_empty() {
                debug!("Clearing {} highlights", map.len());
                map.clear();
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }

    fn cancel_clear(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        for handle in pending.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for GlobalClearTimer {
    fn drop(&mut self) {
        self.cancel_clear();
    }
}
