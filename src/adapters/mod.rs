//! Infrastructure adapters for external systems.

pub mod clock;
pub mod hass;
pub mod http;
pub mod memory;
