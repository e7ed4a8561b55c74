//! Self-re-arming daily scheduler.
//!
//! One timer chain per session: sleep until the next local midnight
//! (expressed as a UTC instant), run an evaluation pass for the date the
//! timer fired on, then arm the following midnight. The next timer is
//! armed only after the pass completes, so queued-ahead drift cannot
//! accumulate. A session that starts noticeably after midnight gets one
//! immediate catch-up pass for the current day first.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::domain::errors::{RotaError, RotaResult};
use crate::domain::models::chore::Chore;
use crate::domain::ports::{Clock, TodoService};
use crate::services::due_evaluator::DueEvaluator;

/// Local midnight of a calendar day.
fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Drives one evaluation pass per local calendar day.
pub struct MidnightScheduler<T: TodoService, C: Clock> {
    evaluator: Arc<DueEvaluator<T>>,
    clock: Arc<C>,
    grace: Duration,
}

/// First wake-up decision for a new chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WakePlan {
    /// Run one evaluation for the current day before sleeping.
    catch_up: bool,
    /// UTC instant of the first armed wake-up.
    target: DateTime<Utc>,
}

impl<T: TodoService + 'static, C: Clock + 'static> MidnightScheduler<T, C> {
    /// Create a scheduler.
    ///
    /// `grace_secs` is how far past local midnight a session may start
    /// and still treat today's firing as elapsed (triggering the
    /// immediate catch-up pass).
    pub fn new(evaluator: Arc<DueEvaluator<T>>, clock: Arc<C>, grace_secs: u64) -> Self {
        let grace = Duration::seconds(i64::try_from(grace_secs).unwrap_or(86_400));
        Self { evaluator, clock, grace }
    }

    /// Arm a new timer chain over `chores`.
    ///
    /// Fails when the first wake-up target cannot be computed; that is
    /// fatal to the chain and surfaces synchronously. Later re-arm
    /// failures stop the chain and are logged.
    pub fn start(&self, chores: Arc<Vec<Chore>>) -> RotaResult<ChainHandle> {
        let plan = self.first_wake()?;
        debug!(
            catch_up = plan.catch_up,
            target = %plan.target,
            tasks = chores.len(),
            "arming timer chain"
        );

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let evaluator = Arc::clone(&self.evaluator);
        let clock = Arc::clone(&self.clock);
        let task = tokio::spawn(run_chain(evaluator, clock, chores, plan, cancel_rx));

        Ok(ChainHandle { cancel_tx, task })
    }

    /// Decide the first wake-up: catch up for today when the session
    /// starts at least `grace` past local midnight, otherwise let the
    /// (possibly already elapsed) midnight timer fire on its own.
    fn first_wake(&self) -> RotaResult<WakePlan> {
        let now = self.clock.now_utc();
        let today = self.clock.today();
        let today_midnight = self.clock.to_utc(midnight(today))?;

        if now >= today_midnight + self.grace {
            Ok(WakePlan { catch_up: true, target: next_midnight(&*self.clock, today)? })
        } else {
            Ok(WakePlan { catch_up: false, target: today_midnight })
        }
    }
}

/// UTC instant of local midnight of the day after `date`.
fn next_midnight<C: Clock>(clock: &C, date: NaiveDate) -> RotaResult<DateTime<Utc>> {
    let tomorrow = date
        .succ_opt()
        .ok_or_else(|| RotaError::Scheduling(format!("no calendar day after {date}")))?;
    clock.to_utc(midnight(tomorrow))
}

async fn run_chain<T: TodoService, C: Clock>(
    evaluator: Arc<DueEvaluator<T>>,
    clock: Arc<C>,
    chores: Arc<Vec<Chore>>,
    plan: WakePlan,
    mut cancel_rx: watch::Receiver<bool>,
) {
    if plan.catch_up {
        let today = clock.today();
        info!(date = %today, "session started past midnight, running catch-up pass");
        evaluator.process_due_tasks(&chores, today).await;
    }

    let mut target = plan.target;
    loop {
        if !sleep_until(&*clock, target, &mut cancel_rx).await {
            info!("timer chain cancelled");
            break;
        }

        let fired_on = clock.today();
        evaluator.process_due_tasks(&chores, fired_on).await;

        // Tomorrow relative to the firing date: a pass that straddles
        // midnight re-arms an already elapsed target and fires again
        // immediately instead of skipping the new day.
        target = match next_midnight(&*clock, fired_on) {
            Ok(next) => next,
            Err(err) => {
                error!(error = %err, "failed to arm next wake-up, stopping timer chain");
                break;
            }
        };
    }
}

/// Sleep until `target`, waking early on cancellation. Returns `true`
/// when the target instant was reached, `false` when cancelled.
async fn sleep_until<C: Clock>(
    clock: &C,
    target: DateTime<Utc>,
    cancel_rx: &mut watch::Receiver<bool>,
) -> bool {
    if *cancel_rx.borrow() {
        return false;
    }

    let remaining = target.signed_duration_since(clock.now_utc());
    let Ok(remaining) = remaining.to_std() else {
        // Already at or past the target.
        return true;
    };

    tokio::select! {
        // A closed channel means the handle was dropped; stop firing.
        changed = cancel_rx.changed() => {
            drop(changed);
            false
        }
        () = tokio::time::sleep(remaining) => true,
    }
}

/// Handle over one armed timer chain.
///
/// Cancellation is idempotent and only prevents future firings; a pass
/// already in flight completes. Dropping the handle also cancels the
/// chain.
pub struct ChainHandle {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ChainHandle {
    /// Cancel the pending wake-up and any future ones.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Whether the chain has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Wait for the chain task to finish. Call after [`Self::cancel`] to
    /// guarantee no pass is left in flight.
    pub async fn join(self) {
        if let Err(err) = self.task.await {
            if err.is_panic() {
                error!("timer chain task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::memory::InMemoryTodoService;
    use chrono::FixedOffset;
    use std::time::Duration as StdDuration;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn local(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    fn chores() -> Arc<Vec<Chore>> {
        Arc::new(vec![Chore {
            name: "Red bin".to_string(),
            list: "todo.chores".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 18).unwrap(),
            period_days: 1,
            weekday: None,
        }])
    }

    fn weekday_chore(name: &str, weekday: u8) -> Chore {
        Chore {
            name: name.to_string(),
            list: "todo.chores".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 11, 18).unwrap(),
            period_days: 1,
            weekday: Some(weekday),
        }
    }

    fn scheduler(
        todo: &Arc<InMemoryTodoService>,
        clock: &Arc<ManualClock>,
        grace_secs: u64,
    ) -> MidnightScheduler<InMemoryTodoService, ManualClock> {
        MidnightScheduler::new(
            Arc::new(DueEvaluator::new(Arc::clone(todo))),
            Arc::clone(clock),
            grace_secs,
        )
    }

    async fn wait_for_created(todo: &InMemoryTodoService, count: usize, timeout_ms: u64) -> bool {
        let deadline = std::time::Instant::now() + StdDuration::from_millis(timeout_ms);
        while std::time::Instant::now() < deadline {
            if todo.created_items().await.len() >= count {
                return true;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        todo.created_items().await.len() >= count
    }

    #[tokio::test]
    async fn test_first_wake_past_grace_catches_up() {
        let todo = Arc::new(InMemoryTodoService::new());
        let clock = Arc::new(ManualClock::at_local(local("2025-12-02 14:00:00"), offset()));
        let sched = scheduler(&todo, &clock, 60);

        let plan = sched.first_wake().unwrap();
        assert!(plan.catch_up);
        // Next wake-up is tomorrow's local midnight, not today's.
        let tomorrow = clock.to_utc(local("2025-12-03 00:00:00")).unwrap();
        assert_eq!(plan.target, tomorrow);
    }

    #[tokio::test]
    async fn test_first_wake_within_grace_targets_today() {
        let todo = Arc::new(InMemoryTodoService::new());
        let clock = Arc::new(ManualClock::at_local(local("2025-12-02 00:00:30"), offset()));
        let sched = scheduler(&todo, &clock, 60);

        let plan = sched.first_wake().unwrap();
        assert!(!plan.catch_up);
        let today = clock.to_utc(local("2025-12-02 00:00:00")).unwrap();
        assert_eq!(plan.target, today);
    }

    #[tokio::test]
    async fn test_first_wake_exactly_at_grace_boundary() {
        let todo = Arc::new(InMemoryTodoService::new());
        let clock = Arc::new(ManualClock::at_local(local("2025-12-02 00:01:00"), offset()));
        let sched = scheduler(&todo, &clock, 60);
        assert!(sched.first_wake().unwrap().catch_up);

        clock.set_local(local("2025-12-02 00:00:59"));
        assert!(!sched.first_wake().unwrap().catch_up);
    }

    #[tokio::test]
    async fn test_catch_up_runs_one_immediate_pass() {
        let todo = Arc::new(InMemoryTodoService::new());
        let clock = Arc::new(ManualClock::at_local(local("2025-12-02 14:00:00"), offset()));
        let handle = scheduler(&todo, &clock, 60).start(chores()).unwrap();

        assert!(wait_for_created(&todo, 1, 1000).await);

        handle.cancel();
        handle.join().await;

        let created = todo.created_items().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].due, local("2025-12-02 00:00:00"));
    }

    #[tokio::test]
    async fn test_elapsed_midnight_target_fires_immediately() {
        let todo = Arc::new(InMemoryTodoService::new());
        // 30s past midnight, within the grace window: no catch-up pass,
        // but the armed timer target is already elapsed and fires at once.
        let clock = Arc::new(ManualClock::at_local(local("2025-12-02 00:00:30"), offset()));
        let handle = scheduler(&todo, &clock, 60).start(chores()).unwrap();

        assert!(wait_for_created(&todo, 1, 1000).await);

        handle.cancel();
        handle.join().await;
        assert_eq!(todo.created_items().await.len(), 1);
    }

    #[tokio::test]
    async fn test_chain_rearms_and_fires_next_day() {
        let todo = Arc::new(InMemoryTodoService::new());
        // 200ms of real time before the next local midnight. Dec 2 is a
        // Tuesday and Dec 3 a Wednesday, so each day creates a distinct
        // chore and the open-item guard stays out of the picture.
        let clock = Arc::new(ManualClock::at_local(local("2025-12-02 23:59:59.800"), offset()));
        let set = Arc::new(vec![
            weekday_chore("Tuesday tidy", 1),
            weekday_chore("Wednesday wash", 2),
        ]);
        let handle = scheduler(&todo, &clock, 60).start(set).unwrap();

        // Catch-up pass for Dec 2 happens immediately.
        assert!(wait_for_created(&todo, 1, 1000).await);

        // Let the armed midnight timer find Dec 3 when it fires.
        clock.set_local(local("2025-12-03 00:00:00.100"));
        assert!(wait_for_created(&todo, 2, 2000).await);

        handle.cancel();
        handle.join().await;

        let created = todo.created_items().await;
        assert_eq!(created[0].summary, "Tuesday tidy");
        assert_eq!(created[0].due.date(), NaiveDate::from_ymd_opt(2025, 12, 2).unwrap());
        assert_eq!(created[1].summary, "Wednesday wash");
        assert_eq!(created[1].due.date(), NaiveDate::from_ymd_opt(2025, 12, 3).unwrap());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let todo = Arc::new(InMemoryTodoService::new());
        let clock = Arc::new(ManualClock::at_local(local("2025-12-02 12:00:00"), offset()));
        let handle = scheduler(&todo, &clock, 60).start(Arc::new(vec![])).unwrap();

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        handle.join().await;
    }
}
