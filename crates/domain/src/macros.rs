//! Declarative macros for domain boilerplate
//!
//! - [`impl_domain_status_conversions!`] implements `Display` and `FromStr`
//!   for simple status-like enums such as
//!   [`FeatureStability`](crate::FeatureStability).
//! - [`declare_features!`] declares a closed enumeration of features together
//!   with their static metadata.
//!
//! # Example
//!
//! ```rust
//! use featuregate_domain::{declare_features, Feature, FeatureMetadata, FeatureStability};
//!
//! declare_features! {
//!     /// Features of the billing module.
//!     pub enum BillingFeature {
//!         Invoices => FeatureMetadata::new("Invoice generation").groups(&["Billing"]),
//!         Refunds => FeatureMetadata::new("Self-service refunds")
//!             .stability(FeatureStability::Beta)
//!             .togglable_online(false),
//!     }
//! }
//!
//! assert_eq!(BillingFeature::Refunds.name(), "Refunds");
//! assert!(!BillingFeature::Refunds.is_togglable_online());
//! assert_eq!(BillingFeature::ALL.len(), 2);
//! ```

/// Implements Display and FromStr traits for status enums
///
/// This macro generates:
/// - Display trait: converts enum variants to lowercase strings
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(::std::format!(
                        "Invalid {}: {}",
                        ::std::stringify!($enum_name),
                        s
                    )),
                }
            }
        }
    };
}

/// Declares a closed enumeration of features.
///
/// Each variant is paired with an expression producing its
/// [`FeatureMetadata`](crate::FeatureMetadata). The generated enum
/// implements [`Feature`](crate::Feature) (the feature name is the variant
/// identifier), `Display`, and exposes an `ALL` constant listing every
/// variant in declaration order.
#[macro_export]
macro_rules! declare_features {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $metadata:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every declared feature, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
        }

        impl $crate::feature::Feature for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }

            fn metadata(&self) -> $crate::feature::FeatureMetadata {
                match self {
                    $(Self::$variant => $metadata,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::feature::Feature::name(self))
            }
        }
    };
}
