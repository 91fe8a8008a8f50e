//! Layered feature state store.
//!
//! A [`FeatureStateChain`] is an ordered list of [`ChainLink`]s. Each link
//! receives a [`Next`] continuation over the links behind it and decides
//! whether to answer, defer, or veto:
//!
//! 1. [`LinkRole::Guard`] links veto writes and always defer reads.
//! 2. [`LinkRole::Cache`] links answer reads from their backend when they can.
//! 3. Exactly one [`LinkRole::Store`] link gives the final answer for reads.
//! 4. [`LinkRole::Observer`] links only see writes that were persisted.
//!
//! Links may be added in any order; [`FeatureStateChainBuilder::build`]
//! arranges them by role.

mod caching;
mod guard;
mod listener;
mod store;

use std::fmt;
use std::sync::Arc;

pub use caching::CachingLink;
use featuregate_domain::{Feature, FeatureGateError, FeatureState, Result};
pub use guard::ReadonlyGuardLink;
pub use listener::{ListenerLink, LoggingListener};
pub use store::StoreLink;
use tracing::debug;

use crate::ports::StateRepository;

/// Position class of a link. Links are ordered by role, guards first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkRole {
    Guard,
    Cache,
    Store,
    Observer,
}

/// One element of a [`FeatureStateChain`].
pub trait ChainLink: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    fn role(&self) -> LinkRole;

    /// Answer a read or defer to `next`.
    fn read(&self, feature: &dyn Feature, next: Next<'_>) -> Result<Option<FeatureState>>;

    /// Apply a write. Failing aborts the write for every later link.
    fn write(&self, feature: &dyn Feature, state: &FeatureState, next: Next<'_>) -> Result<()>;
}

/// Continuation over the links remaining behind the current one.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    links: &'a [Arc<dyn ChainLink>],
}

impl<'a> Next<'a> {
    fn new(links: &'a [Arc<dyn ChainLink>]) -> Self {
        Self { links }
    }

    /// Read through the remaining links. An exhausted chain answers `None`.
    pub fn read(self, feature: &dyn Feature) -> Result<Option<FeatureState>> {
        match self.links.split_first() {
            Some((head, tail)) => head.read(feature, Next::new(tail)),
            None => Ok(None),
        }
    }

    /// Write through the remaining links. An exhausted chain accepts.
    pub fn write(self, feature: &dyn Feature, state: &FeatureState) -> Result<()> {
        match self.links.split_first() {
            Some((head, tail)) => head.write(feature, state, Next::new(tail)),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.links.iter().map(|link| link.name())).finish()
    }
}

/// Ordered composition of [`ChainLink`]s exposed as a [`StateRepository`].
pub struct FeatureStateChain {
    links: Vec<Arc<dyn ChainLink>>,
}

impl FeatureStateChain {
    pub fn builder() -> FeatureStateChainBuilder {
        FeatureStateChainBuilder::default()
    }

    /// Link names in evaluation order.
    pub fn link_names(&self) -> Vec<&'static str> {
        self.links.iter().map(|link| link.name()).collect()
    }

    fn head(&self) -> Next<'_> {
        Next::new(&self.links)
    }
}

impl StateRepository for FeatureStateChain {
    fn read(&self, feature: &dyn Feature) -> Result<Option<FeatureState>> {
        self.head().read(feature)
    }

    fn write(&self, feature: &dyn Feature, state: &FeatureState) -> Result<()> {
        if state.feature_name != feature.name() {
            return Err(FeatureGateError::InvalidFeature(format!(
                "state for '{}' cannot be written to feature '{}'",
                state.feature_name,
                feature.name()
            )));
        }

        debug!(feature = feature.name(), enabled = state.enabled, "Writing feature state");
        self.head().write(feature, state)
    }
}

impl fmt::Debug for FeatureStateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureStateChain").field("links", &self.link_names()).finish()
    }
}

/// Collects links and arranges them into a [`FeatureStateChain`].
#[derive(Default)]
pub struct FeatureStateChainBuilder {
    links: Vec<Arc<dyn ChainLink>>,
}

impl FeatureStateChainBuilder {
    #[must_use]
    pub fn link(self, link: impl ChainLink + 'static) -> Self {
        self.shared_link(Arc::new(link))
    }

    /// Add a link that is also held elsewhere, e.g. a cache link kept for
    /// invalidation.
    #[must_use]
    pub fn shared_link(mut self, link: Arc<dyn ChainLink>) -> Self {
        self.links.push(link);
        self
    }

    /// Order links by role and validate the composition.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureGateError::Config`] unless exactly one
    /// [`LinkRole::Store`] link was added.
    pub fn build(mut self) -> Result<FeatureStateChain> {
        // stable: links sharing a role keep insertion order
        self.links.sort_by_key(|link| link.role());

        let stores = self.links.iter().filter(|link| link.role() == LinkRole::Store).count();
        if stores != 1 {
            return Err(FeatureGateError::Config(format!(
                "feature state chain needs exactly one store link, found {stores}"
            )));
        }

        let chain = FeatureStateChain { links: self.links };
        debug!(links = ?chain.link_names(), "Feature state chain assembled");
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use featuregate_domain::FeatureMetadata;
    use parking_lot::Mutex;

    use super::*;
    use crate::ports::StateStore;

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
    struct MapStore(Mutex<HashMap<String, FeatureState>>);

    impl StateStore for MapStore {
        fn get(&self, feature_name: &str) -> Result<Option<FeatureState>> {
            Ok(self.0.lock().get(feature_name).cloned())
        }

        fn put(&self, state: &FeatureState) -> Result<()> {
            self.0.lock().insert(state.feature_name.clone(), state.clone());
            Ok(())
        }
    }

    /// Records the order links are visited in.
    struct Tracer {
        name: &'static str,
        role: LinkRole,
        visits: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ChainLink for Tracer {
        fn name(&self) -> &'static str {
            self.name
        }

        fn role(&self) -> LinkRole {
            self.role
        }

        fn read(&self, feature: &dyn Feature, next: Next<'_>) -> Result<Option<FeatureState>> {
            self.visits.lock().push(self.name);
            next.read(feature)
        }

        fn write(&self, feature: &dyn Feature, state: &FeatureState, next: Next<'_>) -> Result<()> {
            self.visits.lock().push(self.name);
            next.write(feature, state)
        }
    }

    #[test]
    fn test_builder_orders_links_by_role() {
        let visits = Arc::new(Mutex::new(Vec::new()));
        let tracer = |name, role| Tracer { name, role, visits: visits.clone() };

        let chain = FeatureStateChain::builder()
            .link(tracer("observer", LinkRole::Observer))
            .link(StoreLink::new(Arc::new(MapStore::default())))
            .link(tracer("cache", LinkRole::Cache))
            .link(tracer("guard", LinkRole::Guard))
            .build()
            .unwrap();

        assert_eq!(chain.link_names(), vec!["guard", "cache", "store", "observer"]);

        chain.write(&Named("X"), &FeatureState::enabled("X")).unwrap();
        assert_eq!(*visits.lock(), vec!["guard", "cache", "observer"]);

        visits.lock().clear();
        let state = chain.read(&Named("X")).unwrap();
        assert_eq!(state, Some(FeatureState::enabled("X")));
        // the store answers, observers behind it are never consulted
        assert_eq!(*visits.lock(), vec!["guard", "cache"]);
    }

    #[test]
    fn test_builder_requires_exactly_one_store() {
        let err = FeatureStateChain::builder().link(ReadonlyGuardLink).build().unwrap_err();
        assert!(matches!(err, FeatureGateError::Config(_)));

        let err = FeatureStateChain::builder()
            .link(StoreLink::new(Arc::new(MapStore::default())))
            .link(StoreLink::new(Arc::new(MapStore::default())))
            .build()
            .unwrap_err();
        assert!(matches!(err, FeatureGateError::Config(_)));
    }

    #[test]
    fn test_write_rejects_mismatched_state() {
        let chain = FeatureStateChain::builder()
            .link(StoreLink::new(Arc::new(MapStore::default())))
            .build()
            .unwrap();

        let err = chain.write(&Named("X"), &FeatureState::enabled("Y")).unwrap_err();
        assert!(matches!(err, FeatureGateError::InvalidFeature(_)));
        assert_eq!(chain.read(&Named("Y")).unwrap(), None);
    }

    #[test]
    fn test_empty_continuation_defaults() {
        let next = Next::new(&[]);
        assert!(next.is_empty());
        assert_eq!(next.read(&Named("X")).unwrap(), None);
        assert!(next.write(&Named("X"), &FeatureState::enabled("X")).is_ok());
    }
}
