//! Task acknowledgement waiter
//!
//! Blocks until the task behind a dispatched command has been answered by
//! every addressed device, then reports what the device said.

use super::super::commands::SharedTaskStore;
use super::super::polling::{timed_poll, PollOutcome, PollSettings};

/// Reason reported when a task finished with failed exchanges. Device
/// error detail stays on the task record; callers only see the marker.
pub const REJECTED_RESPONSE: &str = "Rejected";

/// Polls the task store until a dispatched command has been answered.
pub struct TaskResultWaiter {
    tasks: SharedTaskStore,
    settings: PollSettings,
}

impl TaskResultWaiter {
    pub fn new(tasks: SharedTaskStore, settings: PollSettings) -> Self {
        Self { tasks, settings }
    }

    /// Wait for the acknowledgement of a dispatched command.
    ///
    /// Done once the task is finished; a task with any failed exchange is
    /// a rejection regardless of what else was recorded. On success the
    /// value is the payload the given charge point answered with, if any.
    /// An id the store does not know polls until the deadline.
    pub async fn await_result(
        &self,
        task_id: i32,
        charge_point_id: &str,
    ) -> PollOutcome<Option<String>> {
        let tasks = self.tasks.clone();
        let charge_point = charge_point_id.to_string();

        timed_poll(
            self.settings,
            move || std::future::ready(tasks.snapshot(task_id)),
            |task| task.as_ref().is_some_and(|t| t.finished()),
            |task| task.as_ref().is_some_and(|t| t.error_count > 0),
            move |task| {
                task.and_then(|t| {
                    t.result_for(&charge_point)
                        .and_then(|result| result.response.clone())
                })
            },
            |_| REJECTED_RESPONSE.to_string(),
            "task_result",
        )
        .await
    }
}

// ── Tests ──────────────────────────────────────────────────────
