//! Port for the coordinating clock collaborator.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::domain::errors::RotaResult;

/// Clock the scheduler plans against.
///
/// Local civil time drives dueness (calendar dates, midnights); wake-up
/// targets are converted to the UTC reference timescale before a timer is
/// armed, so DST or timezone shifts cannot drift the firing moment.
pub trait Clock: Send + Sync {
    /// Current instant on the reference timescale.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current date of the local civil calendar.
    fn today(&self) -> NaiveDate;

    /// Resolve a local wall-clock time to its UTC instant.
    ///
    /// Fails when the local time cannot be mapped (a DST gap the
    /// implementation cannot resolve); such a failure is fatal to the
    /// timer chain that requested it.
    fn to_utc(&self, local: NaiveDateTime) -> RotaResult<DateTime<Utc>>;
}
