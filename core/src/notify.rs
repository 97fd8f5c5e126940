//! Change notification for connected overlays.
//!
//! Each overlay connection owns a [`VersionWatcher`] that polls the state
//! store's version counter at a bounded interval and yields each new value
//! once. Versions that change several times between polls coalesce into a
//! single emission of the latest value.

use crate::state::StateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A per-connection observer of the state store's version counter.
pub struct VersionWatcher {
    store: Arc<StateStore>,
    interval: Duration,
    last_seen: u64,
}

impl VersionWatcher {
    /// Start watching from the version current at connect time; that value
    /// is never emitted itself.
    pub fn new(store: Arc<StateStore>, interval: Duration) -> VersionWatcher {
        let last_seen = store.version();
        VersionWatcher {
            store,
            interval,
            last_seen,
        }
    }

    /// Wait until the store's version differs from the last delivered one
    /// and return it. Dropping the future cancels the wait; the owning
    /// connection's teardown is the only cleanup required.
    pub async fn changed(&mut self) -> u64 {
        loop {
            let current = self.store.version();
            if current != self.last_seen {
                self.last_seen = current;
                return current;
            }
            sleep(self.interval).await;
        }
    }

    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }
}
