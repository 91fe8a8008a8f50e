//! Recording doubles for the core ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use featuregate_core::{CacheBackend, FeatureTester, StateChangeListener, StateStore};
use featuregate_domain::{Feature, FeatureGateError, FeatureState, Result};
use parking_lot::Mutex;

/// In-memory store counting every call.
#[derive(Default)]
pub struct CountingStore {
    states: Mutex<HashMap<String, FeatureState>>,
    gets: AtomicUsize,
    puts: AtomicUsize,
    fail_gets: AtomicBool,
    fail_puts: AtomicBool,
}

impl CountingStore {
    pub fn seeded(states: impl IntoIterator<Item = FeatureState>) -> Self {
        let store = Self::default();
        store
            .states
            .lock()
            .extend(states.into_iter().map(|s| (s.feature_name.clone(), s)));
        store
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn stored(&self, name: &str) -> Option<FeatureState> {
        self.states.lock().get(name).cloned()
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

impl StateStore for CountingStore {
    fn get(&self, feature_name: &str) -> Result<Option<FeatureState>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(FeatureGateError::Store("database unavailable".into()));
        }
        Ok(self.stored(feature_name))
    }

    fn put(&self, state: &FeatureState) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(FeatureGateError::Store("disk I/O error".into()));
        }
        self.states.lock().insert(state.feature_name.clone(), state.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<FeatureState>> {
        let mut states: Vec<FeatureState> = self.states.lock().values().cloned().collect();
        states.sort_by(|a, b| a.feature_name.cmp(&b.feature_name));
        Ok(states)
    }
}

/// Map-backed cache whose reads and writes can be made to fail.
#[derive(Default)]
pub struct FlakyCache {
    entries: Mutex<HashMap<String, String>>,
    fail_gets: AtomicBool,
    fail_sets: AtomicBool,
}

impl FlakyCache {
    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl CacheBackend for FlakyCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(FeatureGateError::Cache("connection reset".into()));
        }
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: String, _ttl: Duration) -> Result<()> {
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(FeatureGateError::Cache("connection reset".into()));
        }
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Listener remembering every notification.
#[derive(Default)]
pub struct RecordingListener {
    seen: Mutex<Vec<(String, bool)>>,
    fail: AtomicBool,
}

impl RecordingListener {
    pub fn failing() -> Self {
        let listener = Self::default();
        listener.fail.store(true, Ordering::SeqCst);
        listener
    }

    pub fn seen(&self) -> Vec<(String, bool)> {
        self.seen.lock().clone()
    }
}

impl StateChangeListener for RecordingListener {
    fn on_state_changed(&self, feature: &dyn Feature, state: &FeatureState) -> Result<()> {
        self.seen.lock().push((feature.name().to_string(), state.enabled));
        if self.fail.load(Ordering::SeqCst) {
            return Err(FeatureGateError::Internal("webhook unreachable".into()));
        }
        Ok(())
    }
}

/// Tester flipped by hand, counting how often it was asked.
#[derive(Default)]
pub struct SwitchableTester {
    active: AtomicBool,
    checks: AtomicUsize,
}

impl SwitchableTester {
    pub fn new(active: bool) -> Self {
        let tester = Self::default();
        tester.set(active);
        tester
    }

    pub fn set(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl FeatureTester for SwitchableTester {
    fn is_active(&self, _feature: &dyn Feature) -> Result<bool> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.active.load(Ordering::SeqCst))
    }
}
