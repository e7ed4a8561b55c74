//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use rota::adapters::clock::ManualClock;
use rota::adapters::memory::InMemoryTodoService;
use rota::domain::models::Chore;

/// Parse a `YYYY-MM-DD` date.
#[allow(dead_code)]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Parse a local `YYYY-MM-DD HH:MM:SS[.fff]` timestamp.
#[allow(dead_code)]
pub fn local(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").expect("valid test timestamp")
}

/// Build a chore with no weekday constraint.
#[allow(dead_code)]
pub fn chore(name: &str, list: &str, start: &str, period_days: u32) -> Chore {
    Chore {
        name: name.to_string(),
        list: list.to_string(),
        start_date: date(start),
        period_days,
        weekday: None,
    }
}

/// Build a chore gated to one weekday (0 = Monday).
#[allow(dead_code)]
pub fn weekly_chore(name: &str, list: &str, start: &str, period_days: u32, weekday: u8) -> Chore {
    Chore {
        weekday: Some(weekday),
        ..chore(name, list, start, period_days)
    }
}

/// Manual clock pinned to a fixed +01:00 offset at the given local time.
#[allow(dead_code)]
pub fn clock_at(local_time: &str) -> Arc<ManualClock> {
    let offset = FixedOffset::east_opt(3600).expect("valid offset");
    Arc::new(ManualClock::at_local(local(local_time), offset))
}

/// Poll until the in-memory service holds `count` created items.
///
/// Returns `false` if the timeout elapses first.
#[allow(dead_code)]
pub async fn wait_for_created(todo: &InMemoryTodoService, count: usize, timeout_ms: u64) -> bool {
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if todo.created_items().await.len() >= count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    false
}
