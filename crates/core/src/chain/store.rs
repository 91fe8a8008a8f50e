use std::sync::Arc;

use featuregate_domain::{Feature, FeatureState, Result};

use super::{ChainLink, LinkRole, Next};
use crate::ports::StateStore;

/// Terminal read link backed by the durable [`StateStore`].
///
/// Its read answer is final, including "no state". Writes are persisted
/// first and only then handed to the observers behind it.
pub struct StoreLink<S: StateStore + ?Sized> {
    store: Arc<S>,
}

impl<S: StateStore + ?Sized> StoreLink<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S: StateStore + ?Sized> ChainLink for StoreLink<S> {
    fn name(&self) -> &'static str {
        "store"
    }

    fn role(&self) -> LinkRole {
        LinkRole::Store
    }

    fn read(&self, feature: &dyn Feature, _next: Next<'_>) -> Result<Option<FeatureState>> {
        self.store.get(feature.name())
    }

    fn write(&self, feature: &dyn Feature, state: &FeatureState, next: Next<'_>) -> Result<()> {
        self.store.put(state)?;
        next.write(feature, state)
    }
}
