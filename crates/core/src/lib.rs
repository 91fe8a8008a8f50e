//! # FeatureGate Core
//!
//! Pure gating logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for stores, caches, listeners and caller context
//! - The layered feature state chain and its links
//! - Feature testing, activation strategies and the feature registry
//! - Call interception and the decorator-generating macro
//!
//! ## Architecture Principles
//! - Only depends on `featuregate-domain`
//! - No database, cache engine or subscriber code
//! - All external dependencies via traits
//! - Synchronous: every call completes on the caller's thread

pub mod chain;
pub mod gate;
pub mod ports;
pub mod registry;
pub mod strategy;
pub mod tester;

/// Domain types, re-exported for generated code.
pub use featuregate_domain as domain;

// Re-export commonly used items
pub use chain::{
    CachingLink, ChainLink, FeatureStateChain, LinkRole, ListenerLink, LoggingListener, Next,
    ReadonlyGuardLink, StoreLink,
};
pub use gate::{
    disabled_behavior, DisabledBehavior, Gate, GatedTarget, OperationSignature, ReturnKind,
    TargetKind,
};
pub use ports::{CacheBackend, ContextProvider, StateChangeListener, StateRepository, StateStore};
pub use registry::FeatureRegistry;
pub use strategy::{
    ActivationContext, ActivationStrategy, StaticContextProvider, StrategyRegistry,
    SystemContextProvider,
};
pub use tester::{FeatureManager, FeatureTester};
