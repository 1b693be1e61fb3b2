use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "quillpost_cache_hit_total",
            Unit::Count,
            "Total number of read-through cache hits."
        );
        describe_counter!(
            "quillpost_cache_miss_total",
            Unit::Count,
            "Total number of read-through cache misses."
        );
        describe_counter!(
            "quillpost_cache_evict_total",
            Unit::Count,
            "Total number of cached responses evicted due to capacity."
        );
        describe_counter!(
            "quillpost_cache_store_error_total",
            Unit::Count,
            "Total number of cache store failures on the read path, by operation."
        );
        describe_counter!(
            "quillpost_cache_keys_purged_total",
            Unit::Count,
            "Total number of cache keys removed by invalidation."
        );
        describe_counter!(
            "quillpost_cache_invalidation_failed_total",
            Unit::Count,
            "Total number of pattern deletions that failed, by resource."
        );
        describe_gauge!(
            "quillpost_cache_entries",
            Unit::Count,
            "Number of cached responses after the last expiry sweep."
        );
        describe_histogram!(
            "quillpost_cache_invalidate_ms",
            Unit::Milliseconds,
            "Invalidation latency per write in milliseconds."
        );
    });
}
