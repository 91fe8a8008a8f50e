//! Feature activation checks
//!
//! [`FeatureTester`] is the single question every component asks: "is this
//! feature active right now?". [`FeatureManager`] answers it from the state
//! chain and doubles as the management surface for toggling features.

use std::sync::Arc;

use featuregate_domain::{Feature, FeatureGateError, FeatureState, Result};
use tracing::{info, warn};

use crate::ports::{ContextProvider, StateRepository};
use crate::registry::FeatureRegistry;
use crate::strategy::{StrategyRegistry, SystemContextProvider};

/// Answers whether a feature is active.
///
/// Implementations must not cache answers across calls: activation can depend
/// on time, the calling user, or a toggle that happened a moment ago.
pub trait FeatureTester: Send + Sync {
    fn is_active(&self, feature: &dyn Feature) -> Result<bool>;

    /// Fail with [`FeatureGateError::FeatureDisabled`] unless the feature is
    /// active.
    fn require_active(&self, feature: &dyn Feature) -> Result<()> {
        if self.is_active(feature)? {
            Ok(())
        } else {
            Err(FeatureGateError::disabled(feature.name()))
        }
    }

    /// Like [`require_active`](Self::require_active) with a caller-supplied
    /// failure.
    fn require_active_or_else<E, F>(
        &self,
        feature: &dyn Feature,
        on_failure: F,
    ) -> std::result::Result<(), E>
    where
        Self: Sized,
        E: From<FeatureGateError>,
        F: FnOnce() -> E,
    {
        if self.is_active(feature)? {
            Ok(())
        } else {
            Err(on_failure())
        }
    }
}

impl<T: FeatureTester + ?Sized> FeatureTester for Arc<T> {
    fn is_active(&self, feature: &dyn Feature) -> Result<bool> {
        (**self).is_active(feature)
    }
}

/// Default [`FeatureTester`] backed by a [`StateRepository`].
pub struct FeatureManager {
    repository: Arc<dyn StateRepository>,
    strategies: Arc<StrategyRegistry>,
    context: Arc<dyn ContextProvider>,
}

impl FeatureManager {
    /// Manager with the built-in strategies and an anonymous system context.
    pub fn new(repository: Arc<dyn StateRepository>) -> Self {
        Self {
            repository,
            strategies: Arc::new(StrategyRegistry::with_builtins()),
            context: Arc::new(SystemContextProvider),
        }
    }

    #[must_use]
    pub fn with_strategies(mut self, strategies: Arc<StrategyRegistry>) -> Self {
        self.strategies = strategies;
        self
    }

    #[must_use]
    pub fn with_context_provider(mut self, context: Arc<dyn ContextProvider>) -> Self {
        self.context = context;
        self
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    /// Stored state, `None` when never configured.
    pub fn state(&self, feature: &dyn Feature) -> Result<Option<FeatureState>> {
        self.repository.read(feature)
    }

    /// Replace the state of a feature.
    ///
    /// # Errors
    ///
    /// [`FeatureGateError::PolicyViolation`] when the feature is not togglable
    /// online, backend errors from the store, and
    /// [`FeatureGateError::Notification`] when the state was persisted but a
    /// listener failed.
    pub fn set_state(&self, feature: &dyn Feature, state: FeatureState) -> Result<()> {
        self.repository.write(feature, &state)?;
        info!(feature = feature.name(), state = state.activation_label(), "Feature toggled");
        Ok(())
    }

    /// Enable a feature, keeping its strategy and parameters.
    pub fn enable(&self, feature: &dyn Feature) -> Result<()> {
        self.toggle(feature, true)
    }

    /// Disable a feature, keeping its strategy and parameters.
    pub fn disable(&self, feature: &dyn Feature) -> Result<()> {
        self.toggle(feature, false)
    }

    fn toggle(&self, feature: &dyn Feature, enabled: bool) -> Result<()> {
        let mut state = self
            .state(feature)?
            .unwrap_or_else(|| FeatureState::new(feature.name(), enabled));
        state.enabled = enabled;
        self.set_state(feature, state)
    }

    /// Log which registered features are enabled and which are disabled.
    ///
    /// Pre-release features are annotated with their tier, e.g. `SEARCH[beta]`.
    /// Features whose state cannot be read are logged individually and left
    /// out of the summary.
    pub fn log_feature_states(&self, registry: &FeatureRegistry) {
        let mut enabled = Vec::new();
        let mut disabled = Vec::new();

        for feature in registry.iter() {
            let stability = feature.stability();
            let label = if stability.is_prerelease() {
                format!("{}[{stability}]", feature.name())
            } else {
                feature.name().to_string()
            };

            match self.is_active(&**feature) {
                Ok(true) => enabled.push(label),
                Ok(false) => disabled.push(label),
                Err(e) => warn!(feature = feature.name(), error = %e, "Cannot resolve feature state"),
            }
        }

        info!("Enabled features: {}", summary(&enabled));
        info!("Disabled features: {}", summary(&disabled));
    }
}

fn summary(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

impl FeatureTester for FeatureManager {
    fn is_active(&self, feature: &dyn Feature) -> Result<bool> {
        let Some(state) = self.repository.read(feature)? else {
            return Ok(feature.enabled_by_default());
        };
        if !state.enabled {
            return Ok(false);
        }
        let Some(strategy_id) = state.strategy_id.as_deref() else {
            return Ok(true);
        };

        match self.strategies.get(strategy_id) {
            Some(strategy) => Ok(strategy.is_active(&state, &self.context.current())),
            None => {
                warn!(
                    feature = feature.name(),
                    strategy = strategy_id,
                    "Unknown activation strategy, treating feature as inactive"
                );
                Ok(false)
            }
        }
    }
}
