//! Error conversions for infrastructure crates.

mod conversions;

pub use conversions::InfraError;
