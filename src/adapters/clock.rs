//! Clock implementations.
//!
//! [`SystemClock`] is the production clock over the host's local
//! timezone. [`ManualClock`] is a settable fixed-offset clock for tests,
//! shipped here so integration suites can drive scheduler timing.

use chrono::{DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::sync::{Mutex, PoisonError};

use crate::domain::errors::{RotaError, RotaResult};
use crate::domain::ports::Clock;

/// Production clock: host local timezone, DST-aware conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn to_utc(&self, local: NaiveDateTime) -> RotaResult<DateTime<Utc>> {
        // A DST gap can swallow local midnight in some zones; probe
        // forward an hour at a time for the first instant that exists.
        for hours in 0..=3 {
            let candidate = local + Duration::hours(hours);
            match Local.from_local_datetime(&candidate) {
                LocalResult::Single(dt) => return Ok(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(earliest, _) => return Ok(earliest.with_timezone(&Utc)),
                LocalResult::None => {}
            }
        }
        Err(RotaError::Scheduling(format!(
            "local time {local} cannot be resolved in this timezone"
        )))
    }
}

/// Settable clock with a fixed UTC offset, for tests.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock frozen at the given UTC instant.
    pub fn new(now_utc: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now: Mutex::new(now_utc), offset }
    }

    /// Clock frozen at the given local wall-clock time.
    pub fn at_local(local: NaiveDateTime, offset: FixedOffset) -> Self {
        Self::new(utc_of(local, offset), offset)
    }

    /// Move the clock to a new UTC instant.
    pub fn set(&self, now_utc: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now_utc;
    }

    /// Move the clock to a new local wall-clock time.
    pub fn set_local(&self, local: NaiveDateTime) {
        self.set(utc_of(local, self.offset));
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

/// Fixed-offset conversion is pure arithmetic; no gaps, no ambiguity.
fn utc_of(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    let naive_utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&naive_utc)
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn today(&self) -> NaiveDate {
        self.now_utc().with_timezone(&self.offset).date_naive()
    }

    fn to_utc(&self, local: NaiveDateTime) -> RotaResult<DateTime<Utc>> {
        Ok(utc_of(local, self.offset))
    }
}
