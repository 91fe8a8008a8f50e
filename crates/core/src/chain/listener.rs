use std::sync::Arc;

use featuregate_domain::{Feature, FeatureGateError, FeatureState, Result};
use tracing::{error, info};

use super::{ChainLink, LinkRole, Next};
use crate::ports::StateChangeListener;

/// Notifies listeners about committed state changes.
///
/// Sits behind the store link, so it only ever sees writes that were
/// persisted. It never supplies reads. Every listener runs even if an earlier
/// one fails; failures are reported together as a single
/// [`FeatureGateError::Notification`].
#[derive(Default)]
pub struct ListenerLink {
    listeners: Vec<Arc<dyn StateChangeListener>>,
}

impl ListenerLink {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn StateChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl ChainLink for ListenerLink {
    fn name(&self) -> &'static str {
        "listener"
    }

    fn role(&self) -> LinkRole {
        LinkRole::Observer
    }

    fn read(&self, feature: &dyn Feature, next: Next<'_>) -> Result<Option<FeatureState>> {
        next.read(feature)
    }

    fn write(&self, feature: &dyn Feature, state: &FeatureState, next: Next<'_>) -> Result<()> {
        let failures: Vec<String> = self
            .listeners
            .iter()
            .filter_map(|listener| listener.on_state_changed(feature, state).err())
            .map(|e| e.to_string())
            .collect();

        next.write(feature, state)?;

        if failures.is_empty() {
            return Ok(());
        }

        error!(
            feature = feature.name(),
            failures = failures.len(),
            "State change listeners failed after the new state was persisted"
        );
        Err(FeatureGateError::Notification {
            feature: feature.name().to_string(),
            message: failures.join("; "),
        })
    }
}

/// Logs every committed toggle.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingListener;

impl StateChangeListener for LoggingListener {
    fn on_state_changed(&self, feature: &dyn Feature, state: &FeatureState) -> Result<()> {
        info!("Feature state updated: {}={}", feature.name(), state.activation_label());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use featuregate_domain::FeatureMetadata;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Feature for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn metadata(&self) -> FeatureMetadata {
            FeatureMetadata::new("test")
        }
    }

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<(String, bool)>>,
        fail: bool,
    }

    impl StateChangeListener for Recording {
        fn on_state_changed(&self, feature: &dyn Feature, state: &FeatureState) -> Result<()> {
            self.seen.lock().push((feature.name().to_string(), state.enabled));
            if self.fail {
                return Err(FeatureGateError::Internal("mailer down".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_all_listeners_run_and_failures_are_aggregated() {
        let failing = Arc::new(Recording { fail: true, ..Recording::default() });
        let healthy = Arc::new(Recording::default());
        let link = ListenerLink::new()
            .with_listener(failing.clone())
            .with_listener(Arc::new(LoggingListener))
            .with_listener(healthy.clone());
        assert_eq!(link.len(), 3);

        let err = link
            .write(&Named("X"), &FeatureState::disabled("X"), Next::new(&[]))
            .unwrap_err();

        match err {
            FeatureGateError::Notification { feature, message } => {
                assert_eq!(feature, "X");
                assert!(message.contains("mailer down"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*healthy.seen.lock(), vec![("X".to_string(), false)]);
        assert_eq!(failing.seen.lock().len(), 1);
    }

    #[test]
    fn test_listener_link_never_answers_reads() {
        let link = ListenerLink::new().with_listener(Arc::new(LoggingListener));
        assert_eq!(link.read(&Named("X"), Next::new(&[])).unwrap(), None);
    }
}
