//! Activation strategies
//!
//! An enabled feature may carry a strategy id plus parameters in its
//! [`FeatureState`]. The strategy decides per call whether the feature is
//! active for the current [`ActivationContext`].
//!
//! Built-in strategies:
//! - `gradual`: percentage rollout bucketed by user (`percentage` = 0..=100)
//! - `username`: explicit allow-list (`users` = comma separated names)
//! - `release-date`: active from a point in time (`date` = RFC 3339)

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use featuregate_domain::constants::{
    PARAM_DATE, PARAM_PERCENTAGE, PARAM_USERS, STRATEGY_GRADUAL, STRATEGY_RELEASE_DATE,
    STRATEGY_USERNAME,
};
use featuregate_domain::FeatureState;
use parking_lot::RwLock;
use tracing::warn;

use crate::ports::ContextProvider;

/// Caller context a strategy is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationContext {
    pub user: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub now: DateTime<Utc>,
}

impl ActivationContext {
    pub fn anonymous(now: DateTime<Utc>) -> Self {
        Self { user: None, attributes: BTreeMap::new(), now }
    }

    pub fn for_user(user: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self { user: Some(user.into()), attributes: BTreeMap::new(), now }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Decides activation of an enabled feature that names this strategy.
pub trait ActivationStrategy: Send + Sync {
    fn id(&self) -> &str;

    /// Invalid parameters make the feature inactive.
    fn is_active(&self, state: &FeatureState, context: &ActivationContext) -> bool;
}

/// Percentage rollout with stable per-user buckets.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradualStrategy;

impl GradualStrategy {
    const BUCKETS: u32 = 10_000;

    /// Bucket in `0..10_000` for a user and feature.
    ///
    /// Derived from the BLAKE3 digest of `user:feature`, so buckets are
    /// stable across processes, platforms and releases.
    pub fn bucket(user: &str, feature: &str) -> u32 {
        let digest = blake3::hash(format!("{user}:{feature}").as_bytes());
        let [b0, b1, b2, b3, ..] = *digest.as_bytes();
        u32::from_le_bytes([b0, b1, b2, b3]) % Self::BUCKETS
    }
}

impl ActivationStrategy for GradualStrategy {
    fn id(&self) -> &str {
        STRATEGY_GRADUAL
    }

    fn is_active(&self, state: &FeatureState, context: &ActivationContext) -> bool {
        let percentage = match state.parameter(PARAM_PERCENTAGE).map(|p| p.trim().parse::<u32>())
        {
            Some(Ok(p)) if p <= 100 => p,
            other => {
                warn!(
                    feature = %state.feature_name,
                    value = ?other,
                    "Invalid or missing rollout percentage, treating feature as inactive"
                );
                return false;
            }
        };

        if percentage == 100 {
            return true;
        }
        match context.user.as_deref() {
            Some(user) => Self::bucket(user, &state.feature_name) < percentage * 100,
            None => false,
        }
    }
}

/// Active for an explicit list of users.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsernameStrategy;

impl ActivationStrategy for UsernameStrategy {
    fn id(&self) -> &str {
        STRATEGY_USERNAME
    }

    fn is_active(&self, state: &FeatureState, context: &ActivationContext) -> bool {
        let (Some(user), Some(users)) = (context.user.as_deref(), state.parameter(PARAM_USERS))
        else {
            return false;
        };
        users.split(',').map(str::trim).any(|candidate| !candidate.is_empty() && candidate == user)
    }
}

/// Active once the configured instant has passed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseDateStrategy;

impl ActivationStrategy for ReleaseDateStrategy {
    fn id(&self) -> &str {
        STRATEGY_RELEASE_DATE
    }

    fn is_active(&self, state: &FeatureState, context: &ActivationContext) -> bool {
        let Some(raw) = state.parameter(PARAM_DATE) else {
            warn!(feature = %state.feature_name, "Release date strategy without a date");
            return false;
        };
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(release) => context.now >= release.with_timezone(&Utc),
            Err(e) => {
                warn!(feature = %state.feature_name, value = raw, error = %e, "Invalid release date");
                false
            }
        }
    }
}

/// Strategies by id.
pub struct StrategyRegistry {
    strategies: RwLock<HashMap<String, Arc<dyn ActivationStrategy>>>,
}

impl StrategyRegistry {
    /// Registry without any strategy.
    pub fn empty() -> Self {
        Self { strategies: RwLock::new(HashMap::new()) }
    }

    /// Registry with the built-in strategies.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        registry.register(Arc::new(GradualStrategy));
        registry.register(Arc::new(UsernameStrategy));
        registry.register(Arc::new(ReleaseDateStrategy));
        registry
    }

    /// Register a strategy, returning the one it replaced.
    pub fn register(
        &self,
        strategy: Arc<dyn ActivationStrategy>,
    ) -> Option<Arc<dyn ActivationStrategy>> {
        self.strategies.write().insert(strategy.id().to_string(), strategy)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ActivationStrategy>> {
        self.strategies.read().get(id).cloned()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.strategies.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Always returns the same context.
#[derive(Debug, Clone)]
pub struct StaticContextProvider {
    context: ActivationContext,
}

impl StaticContextProvider {
    pub fn new(context: ActivationContext) -> Self {
        Self { context }
    }
}

impl ContextProvider for StaticContextProvider {
    fn current(&self) -> ActivationContext {
        self.context.clone()
    }
}

/// Anonymous caller at the current wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemContextProvider;

impl ContextProvider for SystemContextProvider {
    fn current(&self) -> ActivationContext {
        ActivationContext::anonymous(Utc::now())
    }
}
