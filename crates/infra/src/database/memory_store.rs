//! Non-persistent feature state store.

use dashmap::DashMap;
use featuregate_core::StateStore;
use featuregate_domain::{FeatureState, Result};

/// [`StateStore`] kept in process memory. State is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: DashMap<String, FeatureState>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `states`; later entries win on duplicate names.
    pub fn seeded(states: impl IntoIterator<Item = FeatureState>) -> Self {
        let store = Self::new();
        for state in states {
            store.states.insert(state.feature_name.clone(), state);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, feature_name: &str) -> Result<Option<FeatureState>> {
        Ok(self.states.get(feature_name).map(|entry| entry.value().clone()))
    }

    fn put(&self, state: &FeatureState) -> Result<()> {
        self.states.insert(state.feature_name.clone(), state.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<FeatureState>> {
        let mut states: Vec<FeatureState> =
            self.states.iter().map(|entry| entry.value().clone()).collect();
        states.sort_by(|a, b| a.feature_name.cmp(&b.feature_name));
        Ok(states)
    }
}
