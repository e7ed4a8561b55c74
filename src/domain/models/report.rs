//! Outcome of one due-task evaluation pass.

use chrono::NaiveDate;
use serde::Serialize;

/// Summary of a single evaluation pass over the task set.
///
/// A pass always completes; per-chore collaborator failures are recorded
/// here instead of aborting the remaining chores.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Local calendar date the pass evaluated.
    pub date: NaiveDate,

    /// Number of chores inspected (the whole task set).
    pub evaluated: usize,

    /// Items created during this pass.
    pub created: Vec<CreatedItem>,

    /// Chores that were due but already had a matching open item.
    pub already_present: Vec<String>,

    /// Chores skipped because their recurrence condition did not hold.
    pub not_due: usize,

    /// Per-chore failures; the rest of the pass still ran.
    pub failures: Vec<ChoreFailure>,
}

/// One to-do item created by a pass.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedItem {
    /// Display text of the created item.
    pub name: String,
    /// Target list the item was created on.
    pub list: String,
    /// Due timestamp in the collaborator's wire format.
    pub due: String,
}

/// A chore whose query/create sequence failed.
#[derive(Debug, Clone, Serialize)]
pub struct ChoreFailure {
    /// Chore name.
    pub name: String,
    /// Target list of the failed call.
    pub list: String,
    /// Collaborator error message.
    pub error: String,
}

impl EvaluationReport {
    /// Empty report for the given date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            evaluated: 0,
            created: Vec::new(),
            already_present: Vec::new(),
            not_due: 0,
            failures: Vec::new(),
        }
    }

    /// Whether any chore in the pass failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
