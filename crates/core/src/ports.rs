//! Port interfaces for feature state
//!
//! These traits define the boundaries between the gating logic and the
//! infrastructure that stores, caches and observes feature state.

use std::time::Duration;

use featuregate_domain::{Feature, FeatureGateError, FeatureState, Result};

use crate::strategy::ActivationContext;

/// Composed read/write surface over feature state.
///
/// Implemented by [`FeatureStateChain`](crate::chain::FeatureStateChain);
/// everything that needs state goes through this trait.
pub trait StateRepository: Send + Sync {
    /// Current state, or `None` when the feature has never been configured.
    fn read(&self, feature: &dyn Feature) -> Result<Option<FeatureState>>;

    /// Replace the state of `feature`.
    fn write(&self, feature: &dyn Feature, state: &FeatureState) -> Result<()>;
}

/// Durable backing store for feature state.
pub trait StateStore: Send + Sync {
    /// Look up the stored state. `Ok(None)` means no row exists.
    fn get(&self, feature_name: &str) -> Result<Option<FeatureState>>;

    /// Insert or replace the state keyed by `state.feature_name`.
    fn put(&self, state: &FeatureState) -> Result<()>;

    /// Every stored state ordered by feature name.
    fn list(&self) -> Result<Vec<FeatureState>> {
        Err(FeatureGateError::Store("listing is not supported by this store".into()))
    }
}

/// Key/value cache holding serialized [`CachedEntry`](featuregate_domain::CachedEntry)
/// envelopes.
pub trait CacheBackend: Send + Sync {
    /// `Ok(None)` is a cache miss, distinct from a cached absence envelope.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    fn invalidate(&self, key: &str) -> Result<()>;
}

/// Observer of committed state changes.
pub trait StateChangeListener: Send + Sync {
    fn on_state_changed(&self, feature: &dyn Feature, state: &FeatureState) -> Result<()>;
}

/// Supplies the caller context that activation strategies evaluate against.
pub trait ContextProvider: Send + Sync {
    fn current(&self) -> ActivationContext;
}
