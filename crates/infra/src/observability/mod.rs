//! Tracing subscriber installation
//!
//! Feature gating emits `tracing` events from every layer; this module wires
//! them to a `tracing-subscriber` fmt layer. `RUST_LOG` takes precedence
//! over the configured filter.

use featuregate_domain::{FeatureGateError, LoggingSettings, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `settings`.
///
/// Calling this more than once is harmless: when a global subscriber is
/// already installed the call leaves it in place and returns `Ok`.
///
/// # Errors
/// Returns `FeatureGateError::Config` if the configured filter directive
/// cannot be parsed and `RUST_LOG` is not set.
pub fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    let filter = build_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if settings.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    match installed {
        Ok(()) => tracing::debug!(json = settings.json, "tracing subscriber installed"),
        Err(e) => tracing::debug!(error = %e, "tracing subscriber already installed"),
    }
    Ok(())
}

/// Filter from `RUST_LOG` when present and valid, otherwise from settings.
fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&settings.filter).map_err(|e| {
            FeatureGateError::Config(format!("Invalid log filter '{}': {e}", settings.filter))
        })
    })
}
