//! Mutable feature state and its cache envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Runtime state of a feature: created on first toggle, replaced on every
/// subsequent toggle, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureState {
    pub feature_name: String,
    pub enabled: bool,
    pub strategy_id: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl FeatureState {
    pub fn new(feature_name: impl Into<String>, enabled: bool) -> Self {
        Self {
            feature_name: feature_name.into(),
            enabled,
            strategy_id: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn enabled(feature_name: impl Into<String>) -> Self {
        Self::new(feature_name, true)
    }

    pub fn disabled(feature_name: impl Into<String>) -> Self {
        Self::new(feature_name, false)
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy_id: impl Into<String>) -> Self {
        self.strategy_id = Some(strategy_id.into());
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// `"enabled"` or `"disabled"`, as used in toggle log lines.
    pub const fn activation_label(&self) -> &'static str {
        if self.enabled {
            "enabled"
        } else {
            "disabled"
        }
    }
}

/// A value held by the state cache.
///
/// A cache miss (no key) is not a `CachedEntry`; it means "ask the delegate".
/// `Absent` records that the delegate had no state for the feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CacheEnvelope", into = "CacheEnvelope")]
pub enum CachedEntry {
    Absent,
    Present(FeatureState),
}

impl CachedEntry {
    pub fn from_lookup(state: Option<FeatureState>) -> Self {
        state.map_or(Self::Absent, Self::Present)
    }

    pub fn into_state(self) -> Option<FeatureState> {
        match self {
            Self::Absent => None,
            Self::Present(state) => Some(state),
        }
    }

    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Wire shape: `{"featureState": <state>|null}`.
#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    #[serde(rename = "featureState")]
    feature_state: Option<FeatureState>,
}

impl From<CacheEnvelope> for CachedEntry {
    fn from(envelope: CacheEnvelope) -> Self {
        Self::from_lookup(envelope.feature_state)
    }
}

impl From<CachedEntry> for CacheEnvelope {
    fn from(entry: CachedEntry) -> Self {
        Self { feature_state: entry.into_state() }
    }
}
