//! Home Assistant adapter.
//!
//! Integrates with a Home Assistant instance over its REST API. The
//! client drives the `todo` service domain: querying a list's open
//! items and creating new ones with a due timestamp.

pub mod client;
pub mod models;

pub use client::HassTodoClient;
