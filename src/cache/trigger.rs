//! Cache trigger service.
//!
//! Entry point for write paths. Wraps the invalidation policy and decides
//! whether deletions run inline or detached from the request.

use tracing::debug;

use super::config::{CacheConfig, InvalidationMode};
use super::events::InvalidationEvent;
use super::policy::{InvalidationPolicy, InvalidationReport};

/// Cache trigger for write operations.
///
/// # Usage
///
/// ```ignore
/// // After the post update is committed:
/// trigger.post_changed(Some(&post.id.to_string())).await;
/// ```
pub struct CacheTrigger {
    config: CacheConfig,
    policy: InvalidationPolicy,
}

impl CacheTrigger {
    pub fn new(config: CacheConfig, policy: InvalidationPolicy) -> Self {
        Self { config, policy }
    }

    /// Dispatch an event according to the configured mode.
    ///
    /// Returns the report in inline mode. Detached dispatch returns `None`
    /// as soon as the deletions are spawned.
    pub async fn trigger(&self, event: InvalidationEvent) -> Option<InvalidationReport> {
        if !self.config.enabled {
            debug!(resource = %event.resource, "Cache trigger skipped: cache disabled");
            return None;
        }

        match self.config.invalidation_mode {
            InvalidationMode::Inline => Some(self.policy.apply(&event).await),
            InvalidationMode::Detached => {
                let policy = self.policy.clone();
                tokio::spawn(async move {
                    policy.apply(&event).await;
                });
                None
            }
        }
    }

    /// A post was created, updated, deleted, liked or disliked.
    pub async fn post_changed(&self, post_id: Option<&str>) -> Option<InvalidationReport> {
        self.trigger(InvalidationEvent::post(post_id)).await
    }

    /// A comment on `post_id` was added or removed.
    pub async fn comments_changed(&self, post_id: Option<&str>) -> Option<InvalidationReport> {
        self.trigger(InvalidationEvent::comments(post_id)).await
    }

    /// A category was created, renamed or deleted.
    pub async fn category_changed(&self) -> Option<InvalidationReport> {
        self.trigger(InvalidationEvent::category()).await
    }
}
