//! Domain layer for the rota reminder system
//!
//! This module contains the core business logic and domain models.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{RotaError, RotaResult};
