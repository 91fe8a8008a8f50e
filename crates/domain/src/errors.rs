//! Error types used throughout feature gating

use thiserror::Error;

/// Main error type for FeatureGate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureGateError {
    /// A gated call or an explicit `require_active` hit a disabled feature.
    #[error("Feature disabled: {feature}")]
    FeatureDisabled { feature: String },

    /// A target could not be wrapped safely. Fatal at setup time.
    #[error("Cannot gate {target}: {reason}")]
    ConstructionRejected { target: String, reason: String },

    /// A write targeted a feature that is not togglable online.
    #[error("Feature is not togglable online: '{feature}'")]
    PolicyViolation { feature: String },

    #[error("Cache backend error: {0}")]
    Cache(String),

    #[error("State store error: {0}")]
    Store(String),

    /// The new state was persisted, but at least one change listener failed.
    #[error("State of feature '{feature}' persisted but change notification failed: {message}")]
    Notification { feature: String, message: String },

    #[error("Invalid feature declaration: {0}")]
    InvalidFeature(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FeatureGateError {
    /// Build a [`FeatureGateError::FeatureDisabled`] for the given feature name.
    pub fn disabled(feature: impl Into<String>) -> Self {
        Self::FeatureDisabled { feature: feature.into() }
    }

    /// Whether the error originates from cache or durable store I/O.
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, Self::Cache(_) | Self::Store(_))
    }

    /// Stable label suitable for metrics and structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FeatureDisabled { .. } => "feature_disabled",
            Self::ConstructionRejected { .. } => "construction_rejected",
            Self::PolicyViolation { .. } => "policy_violation",
            Self::Cache(_) => "cache",
            Self::Store(_) => "store",
            Self::Notification { .. } => "notification",
            Self::InvalidFeature(_) => "invalid_feature",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for FeatureGate operations
pub type Result<T> = std::result::Result<T, FeatureGateError>;
