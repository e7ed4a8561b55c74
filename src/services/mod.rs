pub mod due_evaluator;
pub mod midnight_scheduler;
pub mod session;

pub use due_evaluator::DueEvaluator;
pub use midnight_scheduler::{ChainHandle, MidnightScheduler};
pub use session::SessionManager;
