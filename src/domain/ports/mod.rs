//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the scheduling core consumes:
//! - `TodoService`: the external to-do list (query open items, add item)
//! - `Clock`: local civil time and conversion to the UTC reference
//!   timescale used for arming timers
//!
//! These traits keep the domain independent of the concrete smart-home
//! platform and of the host's real clock.

pub mod clock;
pub mod todo_service;

pub use clock::Clock;
pub use todo_service::{TodoItem, TodoService};
