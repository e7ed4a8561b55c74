//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading with local overrides
//! - ROTA_* environment variable overrides
//! - Configuration validation, including the task definitions

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
