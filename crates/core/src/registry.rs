//! Registry of declared features
//!
//! The management surface addresses features by name; the registry maps those
//! names back to their declarations.

use std::collections::BTreeMap;
use std::sync::Arc;

use featuregate_domain::{Feature, FeatureGateError, Result};

/// Declared features keyed by name.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    features: BTreeMap<String, Arc<dyn Feature>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a closed set of features, typically the `ALL`
    /// constant generated by `declare_features!`.
    pub fn from_features<F>(features: impl IntoIterator<Item = F>) -> Result<Self>
    where
        F: Feature + 'static,
    {
        let mut registry = Self::new();
        for feature in features {
            registry.register(feature)?;
        }
        Ok(registry)
    }

    /// # Errors
    ///
    /// [`FeatureGateError::InvalidFeature`] for a blank name or label, or a
    /// name that is already registered.
    pub fn register(&mut self, feature: impl Feature + 'static) -> Result<()> {
        let name = feature.name().to_string();
        if name.trim().is_empty() {
            return Err(FeatureGateError::InvalidFeature("feature name must not be blank".into()));
        }
        if feature.label().trim().is_empty() {
            return Err(FeatureGateError::InvalidFeature(format!(
                "feature '{name}' must have a label"
            )));
        }
        if self.features.contains_key(&name) {
            return Err(FeatureGateError::InvalidFeature(format!(
                "feature '{name}' is declared more than once"
            )));
        }

        self.features.insert(name, Arc::new(feature));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Feature>> {
        self.features.get(name).cloned()
    }

    /// Like [`get`](Self::get) but fails for unknown names.
    pub fn require(&self, name: &str) -> Result<Arc<dyn Feature>> {
        self.get(name)
            .ok_or_else(|| FeatureGateError::InvalidFeature(format!("unknown feature '{name}'")))
    }

    /// Features sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Feature>> {
        self.features.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.features.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
