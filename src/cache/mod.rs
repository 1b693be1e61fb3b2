//! Quillpost cache system
//!
//! Read-through response caching for the blog API, plus the invalidation
//! policy that purges stale responses after writes.
//!
//! - **Store**: `CacheStore` contract and the bundled `MemoryStore`
//! - **Policy**: maps write events to key patterns and deletes them
//! - **Trigger**: write-path entry point (inline or detached dispatch)
//! - **Middleware**: serves and populates cached GET responses
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! default_ttl_seconds = 300
//! max_entries = 1000
//! invalidation_mode = "inline"
//! ```

mod config;
mod events;
mod keys;
mod lock;
mod middleware;
mod planner;
mod policy;
mod store;
mod sweeper;
mod trigger;

pub use config::{CacheConfig, InvalidationMode};
pub use events::{InvalidationEvent, ResourceType};
pub use keys::{CacheKey, KEY_PREFIX, KeyPattern, WILDCARD};
pub use middleware::{CacheState, X_CACHE, response_cache_layer};
pub use planner::InvalidationPlan;
pub use policy::{InvalidationPolicy, InvalidationReport};
pub use store::{CacheEntry, CacheStore, MemoryStore, StoreError};
pub use sweeper::spawn_expiry_sweeper;
pub use trigger::CacheTrigger;
