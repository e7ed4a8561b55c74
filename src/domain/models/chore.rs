//! Recurring chore definitions and their validation.
//!
//! A [`Chore`] is one recurring reminder rule: a display name, a target
//! to-do list, an anchor date, a period in whole days, and optionally a
//! required weekday. Raw configuration records are turned into validated
//! chores by [`validate_tasks`] / [`parse_tasks_blob`].

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::errors::{RotaError, RotaResult};

/// Format for due timestamps handed to the to-do list collaborator:
/// local midnight of the due day.
pub const DUE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format accepted for `start_date` fields.
pub const START_DATE_FORMAT: &str = "%Y-%m-%d";

/// One recurring reminder rule.
///
/// Immutable once validated. The name doubles as the deduplication key
/// within the target list: an open item with the same summary means the
/// chore is already handled for the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chore {
    /// Display text of the reminder and dedupe key within `list`.
    pub name: String,

    /// Identifier of the target to-do list, in the collaborator's
    /// namespace (e.g. `todo.chores`).
    pub list: String,

    /// Anchor date of the recurrence, in the host's local calendar.
    pub start_date: NaiveDate,

    /// Recurrence interval in whole days, at least 1.
    pub period_days: u32,

    /// Required weekday, 0 = Monday through 6 = Sunday. When present it
    /// is ANDed with the period check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
}

impl Chore {
    /// Whole days elapsed from `start_date` to `date`. Negative while the
    /// chore has not started yet.
    pub fn days_since_start(&self, date: NaiveDate) -> i64 {
        date.signed_duration_since(self.start_date).num_days()
    }

    /// Whether this chore's recurrence condition holds on `date`.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        if let Some(required) = self.weekday {
            if date.weekday().num_days_from_monday() != u32::from(required) {
                return false;
            }
        }
        let days_since = self.days_since_start(date);
        days_since >= 0 && days_since % i64::from(self.period_days) == 0
    }

    /// First date on or after `from` on which this chore is due.
    ///
    /// Returns `None` when the weekday constraint can never line up with
    /// the period (e.g. a 14-day period anchored on a Tuesday with
    /// `weekday` set to Friday).
    pub fn next_due_on(&self, from: NaiveDate) -> Option<NaiveDate> {
        let period = i64::from(self.period_days);
        let first = if from <= self.start_date {
            0
        } else {
            let days = from.signed_duration_since(self.start_date).num_days();
            (days + period - 1) / period
        };
        // Occurrence weekdays repeat within seven occurrences, so a scan
        // of seven decides whether the constraint is satisfiable.
        (first..first + 7).find_map(|n| {
            let offset = u64::try_from(n * period).ok()?;
            let date = self.start_date.checked_add_days(Days::new(offset))?;
            self.is_due_on(date).then_some(date)
        })
    }

    /// The timestamp an item created for `date` is due at: local midnight.
    pub fn due_at(date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN)
    }
}

/// Render a due timestamp in the collaborator's wire format.
pub fn due_timestamp(date: NaiveDate) -> String {
    Chore::due_at(date).format(DUE_TIME_FORMAT).to_string()
}

/// Validate a sequence of raw task records into chores.
///
/// All-or-nothing: the first invalid record aborts the whole call and no
/// partial result is produced. Per record the checks run in a fixed
/// order: `name`, `list`, `start_date`, `period_days`, then `weekday`.
pub fn validate_tasks(raw: &[Value]) -> RotaResult<Vec<Chore>> {
    raw.iter()
        .enumerate()
        .map(|(index, record)| validate_record(index, record))
        .collect()
}

/// Parse a serialized JSON blob of task records and validate it.
///
/// Fails with [`RotaError::MalformedTasks`] when the text is not a JSON
/// list; individual bad records are reported by index through
/// [`validate_tasks`].
pub fn parse_tasks_blob(text: &str) -> RotaResult<Vec<Chore>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| RotaError::MalformedTasks(format!("not valid JSON: {e}")))?;
    let Value::Array(records) = value else {
        return Err(RotaError::MalformedTasks(
            "expected a JSON list of task records".to_string(),
        ));
    };
    validate_tasks(&records)
}

/// Serialize chores to the canonical JSON blob form.
///
/// `parse_tasks_blob(serialize_tasks(set)?) == set` holds for every valid
/// set.
pub fn serialize_tasks(chores: &[Chore]) -> RotaResult<String> {
    Ok(serde_json::to_string_pretty(chores)?)
}

fn validate_record(index: usize, record: &Value) -> RotaResult<Chore> {
    let Some(fields) = record.as_object() else {
        return Err(invalid(index, "record", "expected an object".to_string()));
    };

    let name = required_text(index, fields, "name")?;
    let list = required_text(index, fields, "list")?;

    let start_raw = fields
        .get("start_date")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(index, "start_date", "missing or not a string".to_string()))?;
    let start_date = NaiveDate::parse_from_str(start_raw, START_DATE_FORMAT)
        .map_err(|_| invalid(index, "start_date", format!("expected YYYY-MM-DD, got {start_raw:?}")))?;

    let period = fields
        .get("period_days")
        .and_then(coerce_int)
        .ok_or_else(|| invalid(index, "period_days", "missing or not an integer".to_string()))?;
    let period_days = u32::try_from(period)
        .ok()
        .filter(|p| *p >= 1)
        .ok_or_else(|| invalid(index, "period_days", format!("must be at least 1, got {period}")))?;

    let weekday = match fields.get("weekday") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let wd = coerce_int(value)
                .filter(|w| (0..=6).contains(w))
                .ok_or_else(|| {
                    invalid(index, "weekday", "must be between 0 (Monday) and 6 (Sunday)".to_string())
                })?;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(wd as u8)
        }
    };

    Ok(Chore { name, list, start_date, period_days, weekday })
}

fn required_text(
    index: usize,
    fields: &serde_json::Map<String, Value>,
    field: &'static str,
) -> RotaResult<String> {
    fields
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| invalid(index, field, "missing or empty".to_string()))
}

/// Accept JSON integers and integer-valued strings; the blob is
/// hand-edited text and both shapes occur in the wild.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn invalid(index: usize, field: &'static str, reason: String) -> RotaError {
    RotaError::InvalidTask { index, field, reason }
}
