//! Domain constants
//!
//! Centralized location for defaults shared by configuration, storage and
//! metadata declarations.

// Cache defaults
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;
pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 10_000;
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "featuregate:state:";

// Durable store defaults
pub const DEFAULT_STORE_PATH: &str = "featuregate.db";
pub const DEFAULT_STORE_POOL_SIZE: u32 = 4;

// Logging defaults
pub const DEFAULT_LOG_FILTER: &str = "info";

// Well-known free-text metadata notes
pub const HOW_TO_TOGGLE_REBUILD_REQUIRED: &str =
    "edit the default activation, rebuild module and applications";
pub const BEHAVIOR_STUBBED_WITH_NOT_FOUND: &str = "stubbed with HTTP 404";

// Built-in activation strategy identifiers
pub const STRATEGY_GRADUAL: &str = "gradual";
pub const STRATEGY_USERNAME: &str = "username";
pub const STRATEGY_RELEASE_DATE: &str = "release-date";

// Strategy parameter names
pub const PARAM_PERCENTAGE: &str = "percentage";
pub const PARAM_USERS: &str = "users";
pub const PARAM_DATE: &str = "date";
