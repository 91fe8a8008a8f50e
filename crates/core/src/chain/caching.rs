use std::sync::Arc;
use std::time::Duration;

use featuregate_domain::{CachedEntry, Feature, FeatureGateError, FeatureState, Result};
use tracing::{debug, error, info, warn};

use super::{ChainLink, LinkRole, Next};
use crate::ports::CacheBackend;

/// Read-through / write-through cache in front of the durable store.
///
/// What is cached is a [`CachedEntry`], not the state itself: the store
/// answering "no state" is normal (the feature falls back to its default
/// activation) and that answer is cached as [`CachedEntry::Absent`] so it
/// does not hit the store again until the entry expires.
///
/// Cache backend failures never fail a read; the link degrades to the next
/// link instead. Failures while updating the cache after a successful write
/// are logged and swallowed, leaving the old entry in place until its TTL
/// runs out.
///
/// Reads and writes are not serialised against each other. A read that missed
/// the cache and is still waiting on the store can overwrite the entry a
/// concurrent write just cached, so an older state may be served until the
/// entry expires. Call [`invalidate`](Self::invalidate) to force a reload.
pub struct CachingLink<B: CacheBackend + ?Sized> {
    backend: Arc<B>,
    ttl: Duration,
    key_prefix: String,
}

impl<B: CacheBackend + ?Sized> CachingLink<B> {
    pub fn new(backend: Arc<B>, ttl: Duration, key_prefix: impl Into<String>) -> Self {
        Self { backend, ttl, key_prefix: key_prefix.into() }
    }

    /// Cache key of a feature.
    pub fn key(&self, feature: &dyn Feature) -> String {
        format!("{}{}", self.key_prefix, feature.name())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop the cached entry so the next read goes to the store.
    pub fn invalidate(&self, feature: &dyn Feature) -> Result<()> {
        self.backend.invalidate(&self.key(feature))
    }

    fn lookup(&self, key: &str) -> Result<Option<CachedEntry>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| FeatureGateError::Serialization(format!("cache entry '{key}': {e}")))
    }

    fn store(&self, key: &str, entry: &CachedEntry) -> Result<()> {
        let raw = serde_json::to_string(entry)
            .map_err(|e| FeatureGateError::Serialization(e.to_string()))?;
        self.backend.set(key, raw, self.ttl)
    }
}

fn describe(entry: Option<&CachedEntry>) -> &'static str {
    match entry {
        None => "uncached",
        Some(CachedEntry::Absent) => "unconfigured",
        Some(CachedEntry::Present(state)) => state.activation_label(),
    }
}

impl<B: CacheBackend + ?Sized> ChainLink for CachingLink<B> {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn role(&self) -> LinkRole {
        LinkRole::Cache
    }

    fn read(&self, feature: &dyn Feature, next: Next<'_>) -> Result<Option<FeatureState>> {
        let key = self.key(feature);

        match self.lookup(&key) {
            Ok(Some(entry)) => return Ok(entry.into_state()),
            Ok(None) => {}
            Err(e) => {
                warn!(feature = feature.name(), error = %e, "Cache read failed, reading through");
            }
        }

        let state = next.read(feature)?;
        let entry = CachedEntry::from_lookup(state);
        debug!(
            feature = feature.name(),
            state = describe(Some(&entry)),
            "Caching feature state upon read"
        );
        if let Err(e) = self.store(&key, &entry) {
            warn!(feature = feature.name(), error = %e, "Failed to cache feature state");
        }

        Ok(entry.into_state())
    }

    fn write(&self, feature: &dyn Feature, state: &FeatureState, next: Next<'_>) -> Result<()> {
        let key = self.key(feature);
        let prior = self.lookup(&key).ok().flatten();

        let outcome = next.write(feature, state);
        // a failed notification still means the store committed
        let persisted = matches!(outcome, Ok(()) | Err(FeatureGateError::Notification { .. }));
        if !persisted {
            return outcome;
        }

        match self.store(&key, &CachedEntry::Present(state.clone())) {
            Ok(()) => info!(
                feature = feature.name(),
                prior = describe(prior.as_ref()),
                new = state.activation_label(),
                "Feature state cached upon update"
            ),
            Err(e) => error!(
                feature = feature.name(),
                error = %e,
                "Failed to update cache, it keeps holding the old state until the entry expires"
            ),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use featuregate_domain::FeatureMetadata;
    use parking_lot::Mutex;

    use super::*;
    use crate::chain::{FeatureStateChain, StoreLink};
    use crate::ports::{StateRepository, StateStore};

    #[derive(Debug)]
    struct Named(&'static str);

    impl Feature for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn metadata(&self) -> FeatureMetadata {
            FeatureMetadata::new("test")
        }
    }

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, String>>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl CacheBackend for MapCache {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads {
                return Err(FeatureGateError::Cache("read timeout".into()));
            }
            Ok(self.entries.lock().get(key).cloned())
        }

        fn set(&self, key: &str, value: String, _ttl: Duration) -> Result<()> {
            if self.fail_writes {
                return Err(FeatureGateError::Cache("write timeout".into()));
            }
            self.entries.lock().insert(key.to_string(), value);
            Ok(())
        }

        fn invalidate(&self, key: &str) -> Result<()> {
            self.entries.lock().remove(key);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingStore {
        states: Mutex<HashMap<String, FeatureState>>,
        gets: Mutex<usize>,
    }

    impl StateStore for CountingStore {
        fn get(&self, feature_name: &str) -> Result<Option<FeatureState>> {
            *self.gets.lock() += 1;
            Ok(self.states.lock().get(feature_name).cloned())
        }

        fn put(&self, state: &FeatureState) -> Result<()> {
            self.states.lock().insert(state.feature_name.clone(), state.clone());
            Ok(())
        }
    }

    fn chain(cache: Arc<MapCache>, store: Arc<CountingStore>) -> FeatureStateChain {
        FeatureStateChain::builder()
            .link(StoreLink::new(store))
            .link(CachingLink::new(cache, Duration::from_secs(60), "fg:"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_absence_is_cached() {
        let cache = Arc::new(MapCache::default());
        let store = Arc::new(CountingStore::default());
        let chain = chain(cache.clone(), store.clone());

        assert_eq!(chain.read(&Named("Y")).unwrap(), None);
        assert_eq!(chain.read(&Named("Y")).unwrap(), None);

        assert_eq!(*store.gets.lock(), 1);
        assert_eq!(cache.entries.lock().get("fg:Y").unwrap(), r#"{"featureState":null}"#);
    }

    #[test]
    fn test_write_updates_cache_with_new_state() {
        let cache = Arc::new(MapCache::default());
        let store = Arc::new(CountingStore::default());
        let chain = chain(cache.clone(), store.clone());

        assert_eq!(chain.read(&Named("X")).unwrap(), None);
        chain.write(&Named("X"), &FeatureState::enabled("X")).unwrap();

        assert_eq!(chain.read(&Named("X")).unwrap(), Some(FeatureState::enabled("X")));
        assert_eq!(*store.gets.lock(), 1);
    }

    #[test]
    fn test_cache_read_failure_degrades_to_store() {
        let cache = Arc::new(MapCache { fail_reads: true, ..MapCache::default() });
        let store = Arc::new(CountingStore::default());
        store.put(&FeatureState::enabled("X")).unwrap();
        let chain = chain(cache, store.clone());

        assert_eq!(chain.read(&Named("X")).unwrap(), Some(FeatureState::enabled("X")));
        assert_eq!(chain.read(&Named("X")).unwrap(), Some(FeatureState::enabled("X")));
        assert_eq!(*store.gets.lock(), 2);
    }

    #[test]
    fn test_corrupt_entry_degrades_to_store() {
        let cache = Arc::new(MapCache::default());
        cache.entries.lock().insert("fg:X".into(), "not json".into());
        let store = Arc::new(CountingStore::default());
        store.put(&FeatureState::disabled("X")).unwrap();
        let chain = chain(cache.clone(), store);

        assert_eq!(chain.read(&Named("X")).unwrap(), Some(FeatureState::disabled("X")));
        // the corrupt entry was overwritten by the store's answer
        let raw = cache.entries.lock().get("fg:X").cloned().unwrap();
        assert!(raw.contains("\"enabled\":false"));
    }

    #[test]
    fn test_cache_write_failure_does_not_fail_toggle() {
        let cache = Arc::new(MapCache { fail_writes: true, ..MapCache::default() });
        let store = Arc::new(CountingStore::default());
        let chain = chain(cache, store.clone());

        chain.write(&Named("X"), &FeatureState::enabled("X")).unwrap();
        assert_eq!(store.get("X").unwrap(), Some(FeatureState::enabled("X")));
    }

    #[test]
    fn test_invalidate_forces_store_lookup() {
        let cache = Arc::new(MapCache::default());
        let store = Arc::new(CountingStore::default());
        let link = CachingLink::new(cache.clone(), Duration::from_secs(60), "fg:");

        assert_eq!(link.key(&Named("X")), "fg:X");
        cache.entries.lock().insert("fg:X".into(), r#"{"featureState":null}"#.into());
        link.invalidate(&Named("X")).unwrap();
        assert!(cache.entries.lock().is_empty());

        let chain = chain(cache, store.clone());
        chain.read(&Named("X")).unwrap();
        assert_eq!(*store.gets.lock(), 1);
    }
}
