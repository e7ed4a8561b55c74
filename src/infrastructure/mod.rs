//! Infrastructure layer module
//!
//! This module contains the cross-cutting machinery the daemon runs on:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;
