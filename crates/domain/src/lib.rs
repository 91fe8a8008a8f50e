//! # FeatureGate Domain
//!
//! Business domain types for runtime feature gating.
//!
//! This crate contains:
//! - Feature declarations and their static metadata
//! - Mutable feature state and its cache/wire envelope
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other FeatureGate crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod feature;
pub mod macros;
pub mod state;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use feature::{Feature, FeatureMetadata, FeatureStability};
pub use state::{CachedEntry, FeatureState};
