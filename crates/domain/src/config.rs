//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_KEY_PREFIX, DEFAULT_CACHE_MAX_CAPACITY, DEFAULT_CACHE_TTL_SECONDS,
    DEFAULT_LOG_FILTER, DEFAULT_STORE_PATH, DEFAULT_STORE_POOL_SIZE,
};
use crate::errors::{FeatureGateError, Result};
use crate::impl_domain_status_conversions;

/// Top-level FeatureGate configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureGateConfig {
    pub cache: CacheSettings,
    pub store: StoreSettings,
    pub gate: GateSettings,
    pub logging: LoggingSettings,
}

/// State cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Upper bound on how long a toggle may stay invisible to other replicas.
    pub ttl_seconds: u64,
    pub max_capacity: u64,
    pub key_prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            max_capacity: DEFAULT_CACHE_MAX_CAPACITY,
            key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_string(),
        }
    }
}

/// Durable store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

impl_domain_status_conversions!(StoreBackend {
    Sqlite => "sqlite",
    Memory => "memory",
});

/// Durable store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub path: String,
    pub pool_size: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: DEFAULT_STORE_PATH.to_string(),
            pool_size: DEFAULT_STORE_POOL_SIZE,
        }
    }
}

/// How request-entry-point targets are treated when gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPointPolicy {
    /// Wrap entry points; every operation rejects while the feature is off.
    #[default]
    Intercept,
    /// Never wrap entry points; construction fails.
    Refuse,
}

impl_domain_status_conversions!(EntryPointPolicy {
    Intercept => "intercept",
    Refuse => "refuse",
});

/// Interception configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    pub entry_point_policy: EntryPointPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}

impl FeatureGateConfig {
    /// Reject configurations that cannot produce a working runtime.
    pub fn validate(&self) -> Result<()> {
        if self.store.pool_size == 0 {
            return Err(FeatureGateError::Config("store.pool_size must be at least 1".into()));
        }
        if self.cache.key_prefix.trim().is_empty() {
            return Err(FeatureGateError::Config("cache.key_prefix must not be blank".into()));
        }
        if self.cache.max_capacity == 0 {
            return Err(FeatureGateError::Config("cache.max_capacity must be at least 1".into()));
        }
        Ok(())
    }
}
