//! Cache configuration.
//!
//! Controls the response cache and invalidation dispatch. `Default` holds
//! the defaults the settings loader falls back to.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_MAX_ENTRIES: usize = 1000;
const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60_000;
const DEFAULT_RESPONSE_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// How write paths wait on invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationMode {
    /// Await the deletions before the write returns.
    #[default]
    Inline,
    /// Spawn the deletions and return immediately.
    Detached,
}

impl InvalidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Detached => "detached",
        }
    }
}

impl std::str::FromStr for InvalidationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "detached" => Ok(Self::Detached),
            other => Err(format!("unknown invalidation mode `{other}`")),
        }
    }
}

/// Runtime cache configuration, resolved from the `[cache]` settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Enable read-through caching and invalidation.
    pub enabled: bool,
    /// Time-to-live for cached responses, in seconds.
    pub default_ttl_secs: u64,
    /// Maximum number of cached responses before LRU eviction.
    pub max_entries: usize,
    /// Interval (ms) between sweeps of expired entries.
    pub sweep_interval_ms: u64,
    /// Largest response body the read-through layer will store.
    pub response_body_limit_bytes: usize,
    /// Dispatch mode for invalidation on write paths.
    pub invalidation_mode: InvalidationMode,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_secs: DEFAULT_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            response_body_limit_bytes: DEFAULT_RESPONSE_BODY_LIMIT_BYTES,
            invalidation_mode: InvalidationMode::Inline,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            default_ttl_secs: settings.default_ttl.as_secs(),
            max_entries: settings.max_entries.get(),
            sweep_interval_ms: settings.sweep_interval.as_millis() as u64,
            response_body_limit_bytes: settings.response_body_limit_bytes.get(),
            invalidation_mode: settings.invalidation_mode,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }

    /// Returns the entry limit as NonZeroUsize, clamping to 1 if zero.
    pub fn max_entries_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_entries).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.default_ttl_secs, 300);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.sweep_interval_ms, 60_000);
        assert_eq!(config.response_body_limit_bytes, 1024 * 1024);
        assert_eq!(config.invalidation_mode, InvalidationMode::Inline);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            max_entries: 0,
            ..Default::default()
        };
        assert_eq!(config.max_entries_non_zero().get(), 1);
    }

    #[test]
    fn sweep_interval_never_zero() {
        let config = CacheConfig {
            sweep_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.sweep_interval(), Duration::from_millis(1));
    }

    #[test]
    fn invalidation_mode_parses_case_insensitively() {
        assert_eq!(
            "Detached".parse::<InvalidationMode>(),
            Ok(InvalidationMode::Detached)
        );
        assert_eq!(
            " inline ".parse::<InvalidationMode>(),
            Ok(InvalidationMode::Inline)
        );
        assert!("eventually".parse::<InvalidationMode>().is_err());
    }
}
