//! In-process state cache with moka
//!
//! Holds serialized cache envelopes for the caching link. Every entry carries
//! its own time-to-live, taken from the `ttl` passed to
//! [`CacheBackend::set`], so absent states and configured states expire on
//! the same schedule as the chain asks for.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use featuregate_core::CacheBackend;
//! use featuregate_infra::cache::MokaCacheBackend;
//!
//! let cache = MokaCacheBackend::with_capacity(100);
//! cache.set("featuregate:state:X", r#"{"featureState":null}"#.into(), Duration::from_secs(60))?;
//! assert!(cache.get("featuregate:state:X")?.is_some());
//! # Ok::<(), featuregate_domain::FeatureGateError>(())
//! ```

use std::time::{Duration, Instant};

use featuregate_core::CacheBackend;
use featuregate_domain::{CacheSettings, Result};
use moka::sync::Cache;
use moka::Expiry;

/// Cached payload together with the TTL it was written with.
#[derive(Debug, Clone)]
struct CachedValue {
    payload: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with.
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// [`CacheBackend`] over a bounded `moka::sync::Cache`.
#[derive(Clone)]
pub struct MokaCacheBackend {
    entries: Cache<String, CachedValue>,
    max_capacity: u64,
}

impl MokaCacheBackend {
    /// Create a cache sized from configuration.
    pub fn new(settings: &CacheSettings) -> Self {
        let backend = Self::with_capacity(settings.max_capacity);
        tracing::info!(
            ttl_seconds = settings.ttl_seconds,
            max_capacity = settings.max_capacity,
            key_prefix = %settings.key_prefix,
            "State cache configured"
        );
        backend
    }

    /// Create a cache bounded to `max_capacity` entries.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let entries =
            Cache::builder().max_capacity(max_capacity).expire_after(PerEntryTtl).build();
        Self { entries, max_capacity }
    }

    /// Approximate number of live entries.
    ///
    /// moka applies pending maintenance lazily; the count is flushed first so
    /// it reflects recent inserts and invalidations.
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn max_capacity(&self) -> u64 {
        self.max_capacity
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        tracing::debug!("State cache cleared");
    }
}

impl std::fmt::Debug for MokaCacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheBackend")
            .field("max_capacity", &self.max_capacity)
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}

impl CacheBackend for MokaCacheBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let hit = self.entries.get(key).map(|value| value.payload);
        if hit.is_some() {
            tracing::debug!(key, "State cache hit");
        } else {
            tracing::debug!(key, "State cache miss");
        }
        Ok(hit)
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.entries.insert(key.to_string(), CachedValue { payload: value, ttl });
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<()> {
        self.entries.invalidate(key);
        Ok(())
    }
}
