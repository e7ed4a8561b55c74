//! Reminder session lifecycle.
//!
//! A session binds one validated task set to one timer chain. The host
//! lifecycle (daemon start, config reload, shutdown) maps onto
//! [`SessionManager::replace`] / [`SessionManager::stop`]; the manager
//! guarantees at most one live chain at any time by cancelling and
//! joining the old chain before arming a new one.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::domain::errors::{RotaError, RotaResult};
use crate::domain::models::chore::Chore;
use crate::domain::models::report::EvaluationReport;
use crate::domain::ports::{Clock, TodoService};
use crate::services::due_evaluator::DueEvaluator;
use crate::services::midnight_scheduler::{ChainHandle, MidnightScheduler};

struct ActiveSession {
    id: Uuid,
    chores: Arc<Vec<Chore>>,
    handle: ChainHandle,
}

/// Owns the current reminder session, if any.
pub struct SessionManager<T: TodoService, C: Clock> {
    evaluator: Arc<DueEvaluator<T>>,
    clock: Arc<C>,
    scheduler: MidnightScheduler<T, C>,
    active: Mutex<Option<ActiveSession>>,
}

impl<T: TodoService + 'static, C: Clock + 'static> SessionManager<T, C> {
    /// Create an idle manager over the given collaborators.
    pub fn new(todo: Arc<T>, clock: Arc<C>, grace_secs: u64) -> Self {
        let evaluator = Arc::new(DueEvaluator::new(todo));
        let scheduler =
            MidnightScheduler::new(Arc::clone(&evaluator), Arc::clone(&clock), grace_secs);
        Self { evaluator, clock, scheduler, active: Mutex::new(None) }
    }

    /// Replace the current session with a new task set.
    ///
    /// Cancels and joins the old chain first, then arms a new one.
    /// On an arming failure the manager is left idle and the error
    /// propagates.
    pub async fn replace(&self, chores: Vec<Chore>) -> RotaResult<Uuid> {
        let mut active = self.active.lock().await;
        if let Some(old) = active.take() {
            info!(session = %old.id, "stopping previous session");
            old.handle.cancel();
            old.handle.join().await;
        }

        let chores = Arc::new(chores);
        let handle = self.scheduler.start(Arc::clone(&chores))?;
        let id = Uuid::new_v4();
        info!(session = %id, tasks = chores.len(), "reminder session armed");
        *active = Some(ActiveSession { id, chores, handle });
        Ok(id)
    }

    /// Stop the current session. A no-op when already idle.
    pub async fn stop(&self) {
        let mut active = self.active.lock().await;
        if let Some(old) = active.take() {
            info!(session = %old.id, "stopping reminder session");
            old.handle.cancel();
            old.handle.join().await;
        }
    }

    /// Run one evaluation pass immediately for the live task set.
    ///
    /// Independent of the armed timer; may overlap a scheduled firing,
    /// in which case the open-item check is the duplicate guard.
    pub async fn run_now(&self) -> RotaResult<EvaluationReport> {
        let chores = {
            let active = self.active.lock().await;
            active
                .as_ref()
                .map(|session| Arc::clone(&session.chores))
                .ok_or(RotaError::NoActiveSession)?
        };
        info!("manual trigger, running evaluation pass now");
        Ok(self.evaluator.process_due_tasks(&chores, self.clock.today()).await)
    }

    /// The live session's id and task set.
    pub async fn snapshot(&self) -> RotaResult<(Uuid, Arc<Vec<Chore>>)> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|session| (session.id, Arc::clone(&session.chores)))
            .ok_or(RotaError::NoActiveSession)
    }

    /// Whether a session is currently live.
    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// The manager's notion of the current local calendar day.
    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::memory::InMemoryTodoService;
    use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
    use std::time::Duration as StdDuration;

    fn local(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    fn manager_at(
        todo: &Arc<InMemoryTodoService>,
        time: &str,
    ) -> (SessionManager<InMemoryTodoService, ManualClock>, Arc<ManualClock>) {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let clock = Arc::new(ManualClock::at_local(local(time), offset));
        (SessionManager::new(Arc::clone(todo), Arc::clone(&clock), 60), clock)
    }

    fn chore(name: &str, start: &str) -> Chore {
        Chore {
            name: name.to_string(),
            list: "todo.chores".to_string(),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            period_days: 1,
            weekday: None,
        }
    }

    fn wednesday_chore(name: &str) -> Chore {
        Chore { weekday: Some(2), ..chore(name, "2025-11-18") }
    }

    #[tokio::test]
    async fn test_run_now_requires_active_session() {
        let todo = Arc::new(InMemoryTodoService::new());
        let (manager, _clock) = manager_at(&todo, "2025-12-02 12:00:00");
        assert!(matches!(manager.run_now().await, Err(RotaError::NoActiveSession)));
        assert!(matches!(manager.snapshot().await, Err(RotaError::NoActiveSession)));
    }

    #[tokio::test]
    async fn test_run_now_uses_live_task_set() {
        let todo = Arc::new(InMemoryTodoService::new());
        // Before midnight so the chain stays asleep during the test.
        let (manager, _clock) = manager_at(&todo, "2025-12-02 12:00:00");
        // Half a day in: catch-up pass will fire once; wait it out below.
        manager.replace(vec![chore("Red bin", "2025-11-18")]).await.unwrap();

        tokio::time::sleep(StdDuration::from_millis(50)).await;
        let report = manager.run_now().await.unwrap();

        // Catch-up already created today's item; run-now finds it open.
        assert_eq!(report.already_present, vec!["Red bin".to_string()]);
        assert_eq!(todo.created_items().await.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_swaps_chain_before_timer_fires() {
        let todo = Arc::new(InMemoryTodoService::new());
        // 300ms of real time before midnight. Dec 2 is a Tuesday; both
        // chores want Wednesday, so the catch-up passes create nothing
        // and the first create proves which chain fired at midnight.
        let (manager, clock) = manager_at(&todo, "2025-12-02 23:59:59.700");

        let first = manager.replace(vec![wednesday_chore("Old task")]).await.unwrap();
        let second = manager.replace(vec![wednesday_chore("New task")]).await.unwrap();
        assert_ne!(first, second);

        clock.set_local(local("2025-12-03 00:00:00.100"));
        tokio::time::sleep(StdDuration::from_millis(600)).await;

        let created = todo.created_items().await;
        assert_eq!(created.len(), 1, "only the replacing chain may fire: {created:?}");
        assert_eq!(created[0].summary, "New task");
        assert_eq!(created[0].due.date(), NaiveDate::from_ymd_opt(2025, 12, 3).unwrap());

        manager.stop().await;
        assert!(!manager.is_active().await);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let todo = Arc::new(InMemoryTodoService::new());
        let (manager, _clock) = manager_at(&todo, "2025-12-02 12:00:00");
        manager.replace(vec![]).await.unwrap();
        manager.stop().await;
        manager.stop().await;
        assert!(!manager.is_active().await);
    }
}
