//! HTTP adapter.
//!
//! Hosts the optional manual-trigger API over the live reminder
//! session.

pub mod trigger;

pub use trigger::TriggerServer;
