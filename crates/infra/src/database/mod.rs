//! Durable feature state stores

pub mod feature_state_repository;
pub mod manager;
pub mod memory_store;

pub use feature_state_repository::SqliteStateStore;
pub use manager::DbManager;
pub use memory_store::InMemoryStateStore;
