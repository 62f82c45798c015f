//! ropegrade-store: configuration and achievement repositories.
//!
//! Implements the `AchievementRepository` trait over process memory and over
//! a directory of per-user JSON documents.

pub mod config;
pub mod error;
pub mod json_file;
pub mod memory;

pub use config::{create_store, load_config_from, RopegradeConfig, StoreConfig};
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
