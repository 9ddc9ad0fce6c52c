//! Task registry
//!
//! Process-wide store of dispatched commands. Handed to every collaborator
//! explicitly; nothing in the crate reaches for it through a global.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use super::task::CommunicationTask;
use super::CommandAction;
use crate::domain::ChargePointSelect;

/// Registry of dispatched commands, keyed by task id.
///
/// Locking is per entry: writers mutate a task under its map entry's
/// write lock and [`snapshot`](TaskStore::snapshot) clones under the read
/// lock, so a reader always observes a consistent task state and never a
/// finished flag without the results behind it.
pub struct TaskStore {
    tasks: DashMap<i32, CommunicationTask>,
    next_id: AtomicI32,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }

    /// Register a new task and hand out its id.
    pub fn create(&self, action: CommandAction, targets: Vec<ChargePointSelect>) -> i32 {
        let task_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.tasks
            .insert(task_id, CommunicationTask::new(task_id, action, targets));
        debug!(task_id, action = %action, "Task registered");
        task_id
    }

    /// Consistent copy of the task state, or `None` for an unknown id.
    pub fn snapshot(&self, task_id: i32) -> Option<CommunicationTask> {
        self.tasks.get(&task_id).map(|entry| entry.clone())
    }

    /// Record a device acknowledgement for a task.
    pub fn record_response(
        &self,
        task_id: i32,
        charge_point_id: &str,
        response: impl Into<String>,
    ) {
        match self.tasks.get_mut(&task_id) {
            Some(mut task) => {
                if !task.add_response(charge_point_id, response.into()) {
                    warn!(
                        task_id,
                        charge_point_id, "Response from a device the task never addressed"
                    );
                }
            }
            // Likely a device answering after the task was evicted.
            None => warn!(task_id, charge_point_id, "Response for unknown task"),
        }
    }

    /// Record a failed exchange with one device.
    pub fn record_error(&self, task_id: i32, charge_point_id: &str, message: impl Into<String>) {
        match self.tasks.get_mut(&task_id) {
            Some(mut task) => {
                if !task.add_error(charge_point_id, message.into()) {
                    warn!(
                        task_id,
                        charge_point_id, "Error from a device the task never addressed"
                    );
                }
            }
            None => warn!(task_id, charge_point_id, "Error for unknown task"),
        }
    }

    /// Drop finished tasks started before the cutoff.
    ///
    /// Unfinished tasks are kept regardless of age; a poller may still be
    /// watching them. Returns how many tasks were evicted.
    pub fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.tasks.len();
        self.tasks
            .retain(|_, task| !(task.finished() && task.started_at < cutoff));
        before - self.tasks.len()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe task store
pub type SharedTaskStore = Arc<TaskStore>;

pub fn create_task_store() -> SharedTaskStore {
    Arc::new(TaskStore::new())
}

// ── Tests ──────────────────────────────────────────────────────
