//! Shared test helpers for `featuregate-core` integration tests.
//!
//! These helpers provide recording doubles for every port so that chain and
//! gate tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod doubles;

use featuregate_domain::constants::HOW_TO_TOGGLE_REBUILD_REQUIRED;
use featuregate_domain::{declare_features, FeatureMetadata, FeatureStability};

declare_features! {
    /// Features used across the integration tests.
    pub enum TestFeature {
        X => FeatureMetadata::new("Feature X").groups(&["Core"]),
        Y => FeatureMetadata::new("Feature Y"),
        Preview => FeatureMetadata::new("Preview")
            .stability(FeatureStability::Alpha)
            .enabled_by_default(true),
        Frozen => FeatureMetadata::new("Frozen")
            .togglable_online(false)
            .how_to_toggle(HOW_TO_TOGGLE_REBUILD_REQUIRED),
    }
}
