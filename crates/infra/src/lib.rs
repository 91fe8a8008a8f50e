//! # FeatureGate Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The moka-backed state cache
//! - Durable state stores (SQLite via r2d2, in-memory via dashmap)
//! - Configuration loading from environment and files
//! - Tracing subscriber setup
//! - Runtime bootstrap wiring the state chain together
//!
//! ## Architecture
//! - Implements traits defined in `featuregate-core`
//! - Contains all "impure" code (I/O, global subscriber)

pub mod cache;
pub mod config;
pub mod database;
pub mod errors;
pub mod observability;
pub mod runtime;

// Re-export commonly used items
pub use cache::MokaCacheBackend;
pub use database::{DbManager, InMemoryStateStore, SqliteStateStore};
pub use errors::InfraError;
pub use observability::init_tracing;
pub use runtime::FeatureGateRuntime;
