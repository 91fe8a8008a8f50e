//! Decorator generation.

/// Generates a gated decorator implementing a trait.
///
/// Each trait method is listed with its interception kind:
///
/// - `try fn` returns `Result<(), E>`; skipped (`Ok(())`) while the feature is
///   off, rejected for entry points.
/// - `value fn` returns `Result<T, E>`; always rejected while the feature is
///   off.
///
/// `E` must implement `From<FeatureGateError>`, which also carries failures
/// of the feature check itself. The decorator is generic over
/// the target and passes `PartialEq`, `Eq`, `Hash`, `Display` and `Debug`
/// straight through to it.
///
/// ```
/// use std::sync::Arc;
///
/// use featuregate_core::feature_gated;
/// use featuregate_core::gate::GatedTarget;
/// use featuregate_core::tester::FeatureTester;
/// use featuregate_domain::{
///     declare_features, EntryPointPolicy, Feature, FeatureGateError, FeatureMetadata,
/// };
///
/// declare_features! {
///     pub enum Features {
///         Reports => FeatureMetadata::new("Reports"),
///     }
/// }
///
/// pub trait Reporting {
///     fn track(&self, event: &str) -> Result<(), FeatureGateError>;
///     fn render(&self, id: u32) -> Result<String, FeatureGateError>;
/// }
///
/// struct Reporter;
///
/// impl GatedTarget for Reporter {}
///
/// impl Reporting for Reporter {
///     fn track(&self, _event: &str) -> Result<(), FeatureGateError> {
///         Ok(())
///     }
///
///     fn render(&self, id: u32) -> Result<String, FeatureGateError> {
///         Ok(format!("report #{id}"))
///     }
/// }
///
/// feature_gated! {
///     pub struct GatedReporting: Reporting {
///         try fn track(&self, event: &str) -> Result<(), FeatureGateError>;
///         value fn render(&self, id: u32) -> Result<String, FeatureGateError>;
///     }
/// }
///
/// struct Off;
///
/// impl FeatureTester for Off {
///     fn is_active(&self, _feature: &dyn Feature) -> featuregate_domain::Result<bool> {
///         Ok(false)
///     }
/// }
///
/// let gated =
///     GatedReporting::wrap(Reporter, Features::Reports, Arc::new(Off), EntryPointPolicy::Intercept)
///         .unwrap();
/// assert_eq!(gated.track("opened"), Ok(()));
/// assert_eq!(gated.render(1), Err(FeatureGateError::disabled("Reports")));
/// ```
#[macro_export]
macro_rules! feature_gated {
    (@returns try) => {
        $crate::gate::ReturnKind::UnitResult
    };
    (@returns value) => {
        $crate::gate::ReturnKind::Value
    };

    (@method $trait:path; try $method:ident ($($arg:ident : $ty:ty),*) -> $ret:ty) => {
        fn $method(&self, $($arg: $ty),*) -> $ret {
            let target = &self.target;
            self.gate.try_fire(stringify!($method), move || <T as $trait>::$method(target, $($arg),*))
        }
    };
    (@method $trait:path; value $method:ident ($($arg:ident : $ty:ty),*) -> $ret:ty) => {
        fn $method(&self, $($arg: $ty),*) -> $ret {
            let target = &self.target;
            self.gate.value(stringify!($method), move || <T as $trait>::$method(target, $($arg),*))
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $trait:path {
            $(
                $kind:tt fn $method:ident (&self $(, $arg:ident : $ty:ty)* $(,)?) $(-> $ret:ty)?;
            )+
        }
    ) => {
        $(#[$meta])*
        $vis struct $name<T> {
            target: T,
            gate: $crate::gate::Gate,
        }

        impl<T> $name<T> {
            /// Intercepted operations.
            pub const OPERATIONS: &'static [$crate::gate::OperationSignature] = &[
                $(
                    $crate::gate::OperationSignature::new(
                        stringify!($method),
                        $crate::feature_gated!(@returns $kind),
                    ),
                )+
            ];

            pub fn target(&self) -> &T {
                &self.target
            }

            pub fn into_inner(self) -> T {
                self.target
            }

            pub fn gate(&self) -> &$crate::gate::Gate {
                &self.gate
            }
        }

        impl<T: $trait + $crate::gate::GatedTarget> $name<T> {
            /// Wrap `target` so that every operation is gated by `feature`.
            ///
            /// # Errors
            ///
            /// `ConstructionRejected` when the target cannot be gated safely.
            pub fn wrap(
                target: T,
                feature: impl $crate::domain::Feature + 'static,
                tester: ::std::sync::Arc<dyn $crate::tester::FeatureTester>,
                policy: $crate::domain::EntryPointPolicy,
            ) -> $crate::domain::Result<Self> {
                let gate = $crate::gate::Gate::for_target::<T>(
                    ::std::sync::Arc::new(feature),
                    tester,
                    Self::OPERATIONS,
                    policy,
                )?;
                Ok(Self { target, gate })
            }
        }

        impl<T: $trait> $trait for $name<T> {
            $(
                $crate::feature_gated!(@method $trait; $kind $method ($($arg : $ty),*) $(-> $ret)?);
            )+
        }

        impl<T: ::std::cmp::PartialEq> ::std::cmp::PartialEq for $name<T> {
            fn eq(&self, other: &Self) -> bool {
                self.target == other.target
            }
        }

        impl<T: ::std::cmp::Eq> ::std::cmp::Eq for $name<T> {}

        impl<T: ::std::hash::Hash> ::std::hash::Hash for $name<T> {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                ::std::hash::Hash::hash(&self.target, state)
            }
        }

        impl<T: ::std::fmt::Display> ::std::fmt::Display for $name<T> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.target, f)
            }
        }

        impl<T: ::std::fmt::Debug> ::std::fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(&self.target, f)
            }
        }
    };
}
