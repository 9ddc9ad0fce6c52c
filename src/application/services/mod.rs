//! Application services

mod retention;
mod session;
mod task_waiter;
mod transaction_waiter;

pub use retention::{RetentionConfig, TaskRetention};
pub use session::{SessionService, SessionSettings, SharedSessionService};
pub use task_waiter::{TaskResultWaiter, REJECTED_RESPONSE};
pub use transaction_waiter::TransactionWaiter;
