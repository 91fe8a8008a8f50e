//! Call interception for gated targets.
//!
//! A gated decorator owns a target and a [`Gate`]. Every forwarded call asks
//! the [`FeatureTester`] first; when the feature is off the call is skipped or
//! rejected according to [`disabled_behavior`]:
//!
//! | target kind   | return kind         | feature off          |
//! |---------------|---------------------|----------------------|
//! | entry point   | any                 | reject               |
//! | ordinary      | `Result<(), E>`     | skip, return `Ok`    |
//! | ordinary      | produces a value    | reject               |
//!
//! Every operation returns a `Result`, so a failed feature check always
//! reaches the caller and is never mistaken for a disabled feature.
//!
//! Decorators are generated with [`feature_gated!`](crate::feature_gated).

mod macros;

use std::fmt;
use std::sync::Arc;

use featuregate_domain::{EntryPointPolicy, Feature, FeatureGateError, Result};
use tracing::{error, warn};

use crate::tester::FeatureTester;

/// What kind of object is being gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Ordinary,
    /// Request entry point (controller, handler). Callers always get an
    /// answer, so disabled calls are rejected instead of skipped.
    EntryPoint,
}

/// Shape of an operation's return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    /// Returns `Result<(), E>`.
    UnitResult,
    /// Produces a value the caller consumes.
    Value,
}

/// Outcome of a call while its feature is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisabledBehavior {
    Skip,
    Reject,
}

/// The disabled-feature policy matrix.
pub const fn disabled_behavior(kind: TargetKind, returns: ReturnKind) -> DisabledBehavior {
    match (kind, returns) {
        (TargetKind::EntryPoint, _) | (TargetKind::Ordinary, ReturnKind::Value) => {
            DisabledBehavior::Reject
        }
        (TargetKind::Ordinary, ReturnKind::UnitResult) => DisabledBehavior::Skip,
    }
}

/// Name and return kind of one intercepted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationSignature {
    pub name: &'static str,
    pub returns: ReturnKind,
}

impl OperationSignature {
    pub const fn new(name: &'static str, returns: ReturnKind) -> Self {
        Self { name, returns }
    }
}

/// Implemented by types that may be wrapped in a gated decorator.
pub trait GatedTarget {
    const KIND: TargetKind = TargetKind::Ordinary;

    /// `false` marks a sealed type; wrapping it fails at construction.
    const WRAPPABLE: bool = true;

    fn type_label() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

/// Shared dispatcher behind every generated decorator.
pub struct Gate {
    feature: Arc<dyn Feature>,
    tester: Arc<dyn FeatureTester>,
    kind: TargetKind,
    target: &'static str,
    result_operations: Vec<&'static str>,
}

impl Gate {
    /// Gate for target type `T` exposing `operations`.
    pub fn for_target<T: GatedTarget>(
        feature: Arc<dyn Feature>,
        tester: Arc<dyn FeatureTester>,
        operations: &[OperationSignature],
        policy: EntryPointPolicy,
    ) -> Result<Self> {
        GateBuilder {
            target: T::type_label(),
            kind: T::KIND,
            wrappable: T::WRAPPABLE,
            feature,
            tester,
            policy,
        }
        .build(operations)
    }

    pub fn feature(&self) -> &dyn Feature {
        self.feature.as_ref()
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Operations that fail with `FeatureDisabled` instead of returning a
    /// value while the feature is off.
    pub fn result_operations(&self) -> &[&'static str] {
        &self.result_operations
    }

    /// Forward an operation returning `Result<(), E>`.
    ///
    /// Skipped with `Ok(())` while the feature is off, unless the target is
    /// an entry point. A failed feature check is returned as the error.
    pub fn try_fire<E>(
        &self,
        operation: &'static str,
        call: impl FnOnce() -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E>
    where
        E: From<FeatureGateError>,
    {
        if self.admit(operation, ReturnKind::UnitResult)? {
            call()
        } else {
            Ok(())
        }
    }

    /// Forward an operation producing a value.
    pub fn value<T, E>(
        &self,
        operation: &'static str,
        call: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<FeatureGateError>,
    {
        if self.admit(operation, ReturnKind::Value)? {
            call()
        } else {
            Err(FeatureGateError::disabled(self.feature.name()).into())
        }
    }

    /// `Ok(true)` to forward, `Ok(false)` to skip, `Err` to reject.
    fn admit(&self, operation: &'static str, returns: ReturnKind) -> Result<bool> {
        if self.tester.is_active(self.feature.as_ref())? {
            return Ok(true);
        }

        match disabled_behavior(self.kind, returns) {
            DisabledBehavior::Skip => {
                warn!(
                    feature = self.feature.name(),
                    target = self.target,
                    operation,
                    "Feature disabled, skipping call"
                );
                Ok(false)
            }
            DisabledBehavior::Reject => {
                error!(
                    feature = self.feature.name(),
                    target = self.target,
                    operation,
                    "Feature disabled, rejecting call"
                );
                Err(FeatureGateError::disabled(self.feature.name()))
            }
        }
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("feature", &self.feature.name())
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("result_operations", &self.result_operations)
            .finish_non_exhaustive()
    }
}

/// Construction inputs that do not depend on the target type.
struct GateBuilder {
    target: &'static str,
    kind: TargetKind,
    wrappable: bool,
    feature: Arc<dyn Feature>,
    tester: Arc<dyn FeatureTester>,
    policy: EntryPointPolicy,
}

impl GateBuilder {
    fn reject(&self, reason: String) -> FeatureGateError {
        FeatureGateError::ConstructionRejected { target: self.target.to_string(), reason }
    }

    fn build(self, operations: &[OperationSignature]) -> Result<Gate> {
        if !self.wrappable {
            return Err(self.reject("type is sealed and cannot be wrapped".into()));
        }

        if self.kind == TargetKind::EntryPoint && self.policy == EntryPointPolicy::Refuse {
            return Err(self.reject("entry points are not gated under the refuse policy".into()));
        }

        let result_operations: Vec<&'static str> = operations
            .iter()
            .filter(|op| op.returns == ReturnKind::Value)
            .map(|op| op.name)
            .collect();

        if !result_operations.is_empty() {
            warn!(
                feature = self.feature.name(),
                target = self.target,
                operations = ?result_operations,
                "Operations produce results and fail with FeatureDisabled while the feature is off"
            );
        }

        Ok(Gate {
            feature: self.feature,
            tester: self.tester,
            kind: self.kind,
            target: self.target,
            result_operations,
        })
    }
}
