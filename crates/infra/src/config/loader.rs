//! Configuration loader
//!
//! Loads feature gating configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `FEATUREGATE_STORE_PATH` is missing or a value is invalid, falls
//!    back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `FEATUREGATE_STORE_PATH`: SQLite database path (required)
//! - `FEATUREGATE_STORE_BACKEND`: `sqlite` or `memory`
//! - `FEATUREGATE_STORE_POOL_SIZE`: Connection pool size
//! - `FEATUREGATE_CACHE_ENABLED`: Whether the state cache is used (true/false)
//! - `FEATUREGATE_CACHE_TTL_SECONDS`: Cache entry time-to-live
//! - `FEATUREGATE_CACHE_MAX_CAPACITY`: Maximum cached entries
//! - `FEATUREGATE_CACHE_KEY_PREFIX`: Prefix of every cache key
//! - `FEATUREGATE_ENTRY_POINT_POLICY`: `intercept` or `refuse`
//! - `FEATUREGATE_LOG_FILTER`: Tracing filter directive
//! - `FEATUREGATE_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./featuregate.{toml,json}` then `./config.{toml,json}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use featuregate_domain::{
    CacheSettings, EntryPointPolicy, FeatureGateConfig, FeatureGateError, GateSettings,
    LoggingSettings, Result, StoreBackend, StoreSettings,
};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] =
    ["featuregate.toml", "featuregate.json", "config.toml", "config.json"];
const SEARCH_DIRS: [&str; 3] = [".", "..", "../.."];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `FeatureGateError::Config` if configuration cannot be loaded from
/// either source or fails validation.
pub fn load() -> Result<FeatureGateConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `FEATUREGATE_STORE_PATH` is required; every other variable falls
/// back to its default.
///
/// # Errors
/// Returns `FeatureGateError::Config` if the required variable is missing
/// or a variable has an invalid value.
pub fn load_from_env() -> Result<FeatureGateConfig> {
    let cache_defaults = CacheSettings::default();
    let store_defaults = StoreSettings::default();
    let logging_defaults = LoggingSettings::default();

    let config = FeatureGateConfig {
        cache: CacheSettings {
            enabled: env_bool("FEATUREGATE_CACHE_ENABLED", cache_defaults.enabled),
            ttl_seconds: env_parse("FEATUREGATE_CACHE_TTL_SECONDS", "cache TTL")?
                .unwrap_or(cache_defaults.ttl_seconds),
            max_capacity: env_parse("FEATUREGATE_CACHE_MAX_CAPACITY", "cache capacity")?
                .unwrap_or(cache_defaults.max_capacity),
            key_prefix: env_optional("FEATUREGATE_CACHE_KEY_PREFIX")
                .unwrap_or(cache_defaults.key_prefix),
        },
        store: StoreSettings {
            backend: env_parse::<StoreBackend>("FEATUREGATE_STORE_BACKEND", "store backend")?
                .unwrap_or(store_defaults.backend),
            path: env_var("FEATUREGATE_STORE_PATH")?,
            pool_size: env_parse("FEATUREGATE_STORE_POOL_SIZE", "pool size")?
                .unwrap_or(store_defaults.pool_size),
        },
        gate: GateSettings {
            entry_point_policy: env_parse::<EntryPointPolicy>(
                "FEATUREGATE_ENTRY_POINT_POLICY",
                "entry point policy",
            )?
            .unwrap_or_default(),
        },
        logging: LoggingSettings {
            filter: env_optional("FEATUREGATE_LOG_FILTER").unwrap_or(logging_defaults.filter),
            json: env_bool("FEATUREGATE_LOG_JSON", logging_defaults.json),
        },
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`]. Missing sections and fields take their defaults.
///
/// # Errors
/// Returns `FeatureGateError::Config` if the file is missing, no file is
/// found, the format is invalid or validation fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<FeatureGateConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FeatureGateError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FeatureGateError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FeatureGateError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration, detecting the format from the file extension.
fn parse_config(contents: &str, path: &Path) -> Result<FeatureGateConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| FeatureGateError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(FeatureGateError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Searches the working directory and up to two parents, then the same
/// locations relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut bases = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        bases.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        bases.push(exe_dir);
    }

    candidate_paths(&bases).into_iter().find(|path| path.exists())
}

fn candidate_paths(bases: &[PathBuf]) -> Vec<PathBuf> {
    bases
        .iter()
        .flat_map(|base| {
            SEARCH_DIRS.iter().flat_map(move |dir| {
                CONFIG_FILE_NAMES.iter().map(move |name| base.join(dir).join(name))
            })
        })
        .collect()
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        FeatureGateError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional environment variable, failing on malformed values.
fn env_parse<T>(key: &str, label: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_optional(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| FeatureGateError::Config(format!("Invalid {label} in {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
