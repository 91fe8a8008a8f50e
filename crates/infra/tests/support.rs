//! Shared helpers for `featuregate-infra` integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use featuregate_core::StateChangeListener;
use featuregate_domain::constants::HOW_TO_TOGGLE_REBUILD_REQUIRED;
use featuregate_domain::{
    declare_features, Feature, FeatureGateConfig, FeatureMetadata, FeatureStability,
    FeatureState, Result, StoreBackend,
};
use featuregate_infra::database::DbManager;
use parking_lot::Mutex;
use tempfile::TempDir;

declare_features! {
    /// Features used across the infra integration tests.
    pub enum AppFeature {
        Checkout => FeatureMetadata::new("New checkout").groups(&["Payments"]),
        Search => FeatureMetadata::new("Search v2")
            .stability(FeatureStability::Beta)
            .enabled_by_default(true),
        Ledger => FeatureMetadata::new("Ledger export")
            .togglable_online(false)
            .how_to_toggle(HOW_TO_TOGGLE_REBUILD_REQUIRED),
    }
}

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir should be created");
        let manager =
            DbManager::new(dir.path().join("state.db"), 2).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");
        Self { manager: Arc::new(manager), dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("state.db")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration pointing the SQLite store into `dir`.
pub fn sqlite_config(dir: &TempDir) -> FeatureGateConfig {
    let mut config = FeatureGateConfig::default();
    config.store.backend = StoreBackend::Sqlite;
    config.store.path = dir.path().join("featuregate.db").to_string_lossy().into_owned();
    config.store.pool_size = 2;
    config
}

/// Listener remembering every notification.
#[derive(Default)]
pub struct RecordingListener {
    seen: Mutex<Vec<(String, bool)>>,
}

impl RecordingListener {
    pub fn seen(&self) -> Vec<(String, bool)> {
        self.seen.lock().clone()
    }
}

impl StateChangeListener for RecordingListener {
    fn on_state_changed(&self, feature: &dyn Feature, state: &FeatureState) -> Result<()> {
        self.seen.lock().push((feature.name().to_string(), state.enabled));
        Ok(())
    }
}
