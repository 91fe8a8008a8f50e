use featuregate_domain::{Feature, FeatureGateError, FeatureState, Result};
use tracing::warn;

use super::{ChainLink, LinkRole, Next};

/// Vetoes writes to features that are not togglable online.
///
/// Reads always pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadonlyGuardLink;

impl ChainLink for ReadonlyGuardLink {
    fn name(&self) -> &'static str {
        "readonly-guard"
    }

    fn role(&self) -> LinkRole {
        LinkRole::Guard
    }

    fn read(&self, feature: &dyn Feature, next: Next<'_>) -> Result<Option<FeatureState>> {
        next.read(feature)
    }

    fn write(&self, feature: &dyn Feature, state: &FeatureState, next: Next<'_>) -> Result<()> {
        if !feature.is_togglable_online() {
            let metadata = feature.metadata();
            warn!(
                feature = feature.name(),
                how_to_toggle = metadata.how_to_toggle.unwrap_or("n/a"),
                "Rejected runtime toggle of a feature that is not togglable online"
            );
            return Err(FeatureGateError::PolicyViolation { feature: feature.name().to_string() });
        }

        next.write(feature, state)
    }
}
