//! Feature declarations and their static metadata.
//!
//! A feature is identified by its name alone. Metadata is declared in code,
//! consumed for policy decisions (`togglable_online`) and diagnostics, and
//! never persisted.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Maturity tier of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStability {
    Alpha,
    Beta,
    Rc,
    #[default]
    Stable,
}

impl_domain_status_conversions!(FeatureStability {
    Alpha => "alpha",
    Beta => "beta",
    Rc => "rc",
    Stable => "stable",
});

impl FeatureStability {
    /// Whether the tier should be called out in diagnostics.
    pub const fn is_prerelease(self) -> bool {
        !matches!(self, Self::Stable)
    }
}

/// Static declarative metadata attached to a feature.
///
/// All fields are `'static` so metadata can be built in `const` context and
/// returned by value from [`Feature::metadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureMetadata {
    pub label: &'static str,
    pub groups: &'static [&'static str],
    pub stability: FeatureStability,
    /// Activation used when no state has been stored for the feature.
    pub enabled_by_default: bool,
    pub togglable_online: bool,
    pub how_to_toggle: Option<&'static str>,
    pub behavior_if_disabled: Option<&'static str>,
    /// Module or component the feature lives in.
    pub owner: Option<&'static str>,
}

impl FeatureMetadata {
    pub const fn new(label: &'static str) -> Self {
        Self {
            label,
            groups: &[],
            stability: FeatureStability::Stable,
            enabled_by_default: false,
            togglable_online: true,
            how_to_toggle: None,
            behavior_if_disabled: None,
            owner: None,
        }
    }

    pub const fn groups(mut self, groups: &'static [&'static str]) -> Self {
        self.groups = groups;
        self
    }

    pub const fn stability(mut self, stability: FeatureStability) -> Self {
        self.stability = stability;
        self
    }

    pub const fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.enabled_by_default = enabled;
        self
    }

    pub const fn togglable_online(mut self, togglable: bool) -> Self {
        self.togglable_online = togglable;
        self
    }

    pub const fn how_to_toggle(mut self, note: &'static str) -> Self {
        self.how_to_toggle = Some(note);
        self
    }

    pub const fn behavior_if_disabled(mut self, note: &'static str) -> Self {
        self.behavior_if_disabled = Some(note);
        self
    }

    pub const fn owner(mut self, owner: &'static str) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Group tags with blanks dropped, de-duplicated and sorted.
    pub fn group_names(&self) -> Vec<&'static str> {
        self.groups
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// A gateable feature.
///
/// Implementations are usually generated by
/// [`declare_features!`](crate::declare_features), but any type with a stable
/// name can act as a feature.
pub trait Feature: Debug + Send + Sync {
    /// Stable identifier. Feature identity is the name alone.
    fn name(&self) -> &str;

    fn metadata(&self) -> FeatureMetadata;

    fn label(&self) -> &'static str {
        self.metadata().label
    }

    fn stability(&self) -> FeatureStability {
        self.metadata().stability
    }

    fn enabled_by_default(&self) -> bool {
        self.metadata().enabled_by_default
    }

    /// Whether operators may change the state of this feature at runtime.
    fn is_togglable_online(&self) -> bool {
        self.metadata().togglable_online
    }
}

impl<F: Feature + ?Sized> Feature for &F {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn metadata(&self) -> FeatureMetadata {
        (**self).metadata()
    }
}

impl<F: Feature + ?Sized> Feature for Arc<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn metadata(&self) -> FeatureMetadata {
        (**self).metadata()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::constants::HOW_TO_TOGGLE_REBUILD_REQUIRED;

    #[derive(Debug)]
    struct Dynamic(String);

    impl Feature for Dynamic {
        fn name(&self) -> &str {
            &self.0
        }

        fn metadata(&self) -> FeatureMetadata {
            FeatureMetadata::new("dynamic")
        }
    }

    const LOCKED: FeatureMetadata = FeatureMetadata::new("Locked")
        .groups(&["Ops", " ", "Billing", "Ops"])
        .stability(FeatureStability::Rc)
        .togglable_online(false)
        .how_to_toggle(HOW_TO_TOGGLE_REBUILD_REQUIRED)
        .owner("billing");

    #[test]
    fn test_metadata_defaults() {
        let meta = FeatureMetadata::new("Plain");
        assert!(meta.togglable_online);
        assert!(!meta.enabled_by_default);
        assert_eq!(meta.stability, FeatureStability::Stable);
        assert!(meta.groups.is_empty());
        assert_eq!(meta.how_to_toggle, None);
    }

    #[test]
    fn test_const_builder_sets_every_field() {
        assert_eq!(LOCKED.label, "Locked");
        assert_eq!(LOCKED.stability, FeatureStability::Rc);
        assert!(!LOCKED.togglable_online);
        assert_eq!(LOCKED.how_to_toggle, Some(HOW_TO_TOGGLE_REBUILD_REQUIRED));
        assert_eq!(LOCKED.owner, Some("billing"));
    }

    #[test]
    fn test_group_names_are_trimmed_deduplicated_and_sorted() {
        assert_eq!(LOCKED.group_names(), vec!["Billing", "Ops"]);
    }

    #[test]
    fn test_stability_parsing_and_display() {
        assert_eq!(FeatureStability::from_str("RC").unwrap(), FeatureStability::Rc);
        assert_eq!(FeatureStability::Alpha.to_string(), "alpha");
        assert!(FeatureStability::from_str("gamma").is_err());
        assert!(FeatureStability::Beta.is_prerelease());
        assert!(!FeatureStability::Stable.is_prerelease());
    }

    #[test]
    fn test_stability_serializes_lowercase() {
        let json = serde_json::to_string(&FeatureStability::Rc).unwrap();
        assert_eq!(json, "\"rc\"");
    }

    #[test]
    fn test_feature_helpers_read_metadata() {
        let feature = Dynamic("X".into());
        assert_eq!(feature.name(), "X");
        assert_eq!(feature.label(), "dynamic");
        assert!(feature.is_togglable_online());
        assert!(!(&feature).enabled_by_default());
    }
}
