//! SQLite store behind the full state chain.

mod support;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use featuregate_core::{
    CachingLink, FeatureManager, FeatureStateChain, FeatureTester, ReadonlyGuardLink,
    StateRepository, StateStore, StoreLink,
};
use featuregate_domain::constants::{PARAM_PERCENTAGE, STRATEGY_GRADUAL};
use featuregate_domain::{FeatureGateError, FeatureState};
use featuregate_infra::{MokaCacheBackend, SqliteStateStore};
use support::{AppFeature, TestDatabase};

fn chain_over(db: &TestDatabase, ttl: Duration) -> (FeatureStateChain, Arc<MokaCacheBackend>) {
    let cache = Arc::new(MokaCacheBackend::with_capacity(100));
    let chain = FeatureStateChain::builder()
        .link(ReadonlyGuardLink)
        .link(StoreLink::new(Arc::new(SqliteStateStore::new(db.manager.clone()))))
        .link(CachingLink::new(cache.clone(), ttl, "featuregate:state:"))
        .build()
        .expect("chain should build");
    (chain, cache)
}

#[test]
fn toggle_is_persisted_and_cached() {
    let db = TestDatabase::new();
    let (chain, cache) = chain_over(&db, Duration::from_secs(60));

    chain.write(&AppFeature::Checkout, &FeatureState::enabled("Checkout")).unwrap();

    let store = SqliteStateStore::new(db.manager.clone());
    assert_eq!(store.get("Checkout").unwrap(), Some(FeatureState::enabled("Checkout")));
    assert_eq!(chain.read(&AppFeature::Checkout).unwrap(), Some(FeatureState::enabled("Checkout")));
    assert_eq!(cache.entry_count(), 1);
}

#[test]
fn absent_state_is_cached_until_ttl() {
    let db = TestDatabase::new();
    let (chain, _cache) = chain_over(&db, Duration::from_millis(100));
    let other_replica = SqliteStateStore::new(db.manager.clone());

    assert_eq!(chain.read(&AppFeature::Checkout).unwrap(), None);
    other_replica.put(&FeatureState::enabled("Checkout")).unwrap();

    // still served from the cached absence
    assert_eq!(chain.read(&AppFeature::Checkout).unwrap(), None);

    thread::sleep(Duration::from_millis(300));
    assert_eq!(chain.read(&AppFeature::Checkout).unwrap(), Some(FeatureState::enabled("Checkout")));
}

#[test]
fn non_togglable_feature_never_reaches_sqlite() {
    let db = TestDatabase::new();
    let (chain, _cache) = chain_over(&db, Duration::from_secs(60));

    let err = chain.write(&AppFeature::Ledger, &FeatureState::enabled("Ledger")).unwrap_err();

    assert!(matches!(err, FeatureGateError::PolicyViolation { .. }));
    assert!(SqliteStateStore::new(db.manager.clone()).list().unwrap().is_empty());
}

#[test]
fn state_survives_reopening_the_database() {
    let db = TestDatabase::new();
    {
        let (chain, _cache) = chain_over(&db, Duration::from_secs(60));
        let manager = FeatureManager::new(Arc::new(chain));
        manager
            .set_state(
                &AppFeature::Search,
                FeatureState::enabled("Search")
                    .with_strategy(STRATEGY_GRADUAL)
                    .with_parameter(PARAM_PERCENTAGE, "100"),
            )
            .unwrap();
    }

    let reopened = featuregate_infra::DbManager::new(db.path(), 1).unwrap();
    reopened.run_migrations().unwrap();
    let store = SqliteStateStore::new(Arc::new(reopened));

    let state = store.get("Search").unwrap().unwrap();
    assert_eq!(state.strategy_id.as_deref(), Some(STRATEGY_GRADUAL));
    assert_eq!(state.parameter(PARAM_PERCENTAGE), Some("100"));
}

#[test]
fn manager_applies_defaults_over_sqlite() {
    let db = TestDatabase::new();
    let (chain, _cache) = chain_over(&db, Duration::from_secs(60));
    let manager = FeatureManager::new(Arc::new(chain));

    assert!(manager.is_active(&AppFeature::Search).unwrap());
    assert!(!manager.is_active(&AppFeature::Checkout).unwrap());

    manager.disable(&AppFeature::Search).unwrap();
    manager.enable(&AppFeature::Checkout).unwrap();

    assert!(!manager.is_active(&AppFeature::Search).unwrap());
    assert!(manager.is_active(&AppFeature::Checkout).unwrap());
}
