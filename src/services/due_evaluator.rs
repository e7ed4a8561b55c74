//! Due-task evaluation pass.
//!
//! One pass walks the task set in order, decides per chore whether today
//! is an occurrence, and creates a reminder item unless the target list
//! already holds an open item with the same summary. Chores are isolated
//! units of work: a collaborator failure on one is reported and logged
//! without aborting the rest of the pass.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::domain::errors::RotaResult;
use crate::domain::models::chore::{due_timestamp, Chore};
use crate::domain::models::report::{ChoreFailure, CreatedItem, EvaluationReport};
use crate::domain::ports::TodoService;

/// Evaluates which chores are due and creates their reminder items.
pub struct DueEvaluator<T: TodoService> {
    todo: Arc<T>,
}

impl<T: TodoService> DueEvaluator<T> {
    /// Create an evaluator over the given to-do collaborator.
    pub fn new(todo: Arc<T>) -> Self {
        Self { todo }
    }

    /// Run one evaluation pass for `today` over the whole task set.
    ///
    /// Chores run in set order. A chore whose recurrence condition does
    /// not hold is skipped without touching the collaborator; a due chore
    /// queries its list's open items first and only creates when no open
    /// item matches its name (the sole duplicate guard).
    pub async fn process_due_tasks(&self, chores: &[Chore], today: NaiveDate) -> EvaluationReport {
        let mut report = EvaluationReport::new(today);
        report.evaluated = chores.len();

        for chore in chores {
            if !chore.is_due_on(today) {
                debug!(task = %chore.name, date = %today, "not due today");
                report.not_due += 1;
                continue;
            }

            match self.remind(chore, today).await {
                Ok(true) => report.created.push(CreatedItem {
                    name: chore.name.clone(),
                    list: chore.list.clone(),
                    due: due_timestamp(today),
                }),
                Ok(false) => {
                    debug!(task = %chore.name, list = %chore.list, "open item already present");
                    report.already_present.push(chore.name.clone());
                }
                Err(err) => {
                    error!(task = %chore.name, list = %chore.list, error = %err, "failed to process task");
                    report.failures.push(ChoreFailure {
                        name: chore.name.clone(),
                        list: chore.list.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            date = %today,
            evaluated = report.evaluated,
            created = report.created.len(),
            already_present = report.already_present.len(),
            failed = report.failures.len(),
            "evaluation pass complete"
        );
        report
    }

    /// Query-then-create for one due chore. Returns whether an item was
    /// created (`false` means an open item already satisfied it).
    async fn remind(&self, chore: &Chore, today: NaiveDate) -> RotaResult<bool> {
        let items = self.todo.open_items(&chore.list).await?;
        if items.iter().any(|item| item.summary == chore.name) {
            return Ok(false);
        }

        self.todo.add_item(&chore.list, &chore.name, Chore::due_at(today)).await?;
        info!(task = %chore.name, list = %chore.list, "created todo item");
        Ok(true)
    }
}
