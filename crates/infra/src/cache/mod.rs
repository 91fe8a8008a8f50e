//! State cache backends

pub mod moka_backend;

pub use moka_backend::MokaCacheBackend;
