//! Invalidation policy.
//!
//! Translates a completed write into pattern deletions against the injected
//! cache store. Deletions are best-effort: failures are logged and counted,
//! never returned to the write path.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, warn};

use super::events::InvalidationEvent;
use super::planner::InvalidationPlan;
use super::store::CacheStore;

const METRIC_KEYS_PURGED_TOTAL: &str = "quillpost_cache_keys_purged_total";
const METRIC_INVALIDATION_FAILED_TOTAL: &str = "quillpost_cache_invalidation_failed_total";
const METRIC_INVALIDATE_MS: &str = "quillpost_cache_invalidate_ms";

/// Outcome of one invalidation, for logs and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Pattern deletions issued against the store.
    pub issued: usize,
    /// Keys the store reported as deleted.
    pub purged: u64,
    /// Deletions that failed and were swallowed.
    pub failed: usize,
}

impl InvalidationReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Stateless mapping from write events to cache purges.
#[derive(Clone)]
pub struct InvalidationPolicy {
    store: Arc<dyn CacheStore>,
}

impl InvalidationPolicy {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Purge post list views, plus the post's detail views when `post_id` is set.
    pub async fn invalidate_post(&self, post_id: Option<&str>) -> InvalidationReport {
        self.apply(&InvalidationEvent::post(post_id)).await
    }

    /// Purge the comment views of a post. No-op without a post id.
    pub async fn invalidate_comments(&self, post_id: Option<&str>) -> InvalidationReport {
        self.apply(&InvalidationEvent::comments(post_id)).await
    }

    /// Purge category views and post list views.
    pub async fn invalidate_category(&self) -> InvalidationReport {
        self.apply(&InvalidationEvent::category()).await
    }

    /// Plan and execute the deletions for `event`.
    pub async fn apply(&self, event: &InvalidationEvent) -> InvalidationReport {
        let plan = InvalidationPlan::for_event(event);
        if plan.is_empty() {
            debug!(
                resource = %event.resource,
                "Cache invalidation skipped: nothing to purge"
            );
            return InvalidationReport::default();
        }

        let started_at = Instant::now();
        let mut report = InvalidationReport::default();

        for pattern in &plan.patterns {
            report.issued += 1;
            match self.store.del(pattern).await {
                Ok(deleted) => {
                    report.purged += deleted;
                    counter!(METRIC_KEYS_PURGED_TOTAL).increment(deleted);
                }
                Err(err) => {
                    report.failed += 1;
                    counter!(
                        METRIC_INVALIDATION_FAILED_TOTAL,
                        "resource" => event.resource.as_str()
                    )
                    .increment(1);
                    warn!(
                        resource = %event.resource,
                        pattern = %pattern,
                        provider = self.store.provider_name(),
                        error = %err,
                        "Cache invalidation failed; entry will expire by TTL"
                    );
                }
            }
        }

        histogram!(METRIC_INVALIDATE_MS)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        debug!(
            resource = %event.resource,
            resource_id = event.id().unwrap_or(""),
            plan = %plan,
            purged = report.purged,
            failed = report.failed,
            "Cache invalidation complete"
        );

        report
    }
}
