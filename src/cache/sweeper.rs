//! Background purge of expired entries.
//!
//! Reads already treat expired entries as misses; the sweeper only bounds
//! how long dead payloads occupy memory between reads.

use std::sync::Arc;
use std::time::Duration;

use metrics::gauge;
use tokio::task::JoinHandle;
use tracing::debug;

use super::store::MemoryStore;

const METRIC_CACHE_ENTRIES: &str = "quillpost_cache_entries";

/// Spawn a task that purges expired entries every `interval`.
///
/// The caller owns the handle and aborts it on shutdown.
pub fn spawn_expiry_sweeper(store: Arc<MemoryStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // Skip the first immediate tick
        loop {
            ticker.tick().await;
            sweep_once(&store);
        }
    })
}

fn sweep_once(store: &MemoryStore) -> usize {
    let purged = store.purge_expired();
    gauge!(METRIC_CACHE_ENTRIES).set(store.len() as f64);
    if purged > 0 {
        debug!(purged, remaining = store.len(), "Swept expired cache entries");
    }
    purged
}
