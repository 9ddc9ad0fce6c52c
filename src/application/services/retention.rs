//! Task retention sweeper
//!
//! Finished communication tasks stay queryable for a while so late
//! callers can still look up what a device answered. This sweeper runs
//! in the background and evicts them once they fall out of the retention
//! window. Unfinished tasks are never touched; a waiter may still be
//! polling them.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::super::commands::SharedTaskStore;
use crate::infrastructure::shutdown::ShutdownSignal;

/// Configuration for the retention sweeper
#[derive(Debug, Clone, Copy)]
pub struct RetentionConfig {
    /// How often to sweep
    pub sweep_interval: Duration,
    /// How long finished tasks stay queryable
    pub retain_for: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
            retain_for: Duration::from_secs(3600),
        }
    }
}

/// Background eviction of finished communication tasks.
pub struct TaskRetention {
    tasks: SharedTaskStore,
    config: RetentionConfig,
}

impl TaskRetention {
    pub fn new(tasks: SharedTaskStore, config: RetentionConfig) -> Self {
        Self { tasks, config }
    }

    /// Start the sweeper background task.
    pub fn start(&self, shutdown: ShutdownSignal) -> JoinHandle<()> {
        let tasks = self.tasks.clone();
        let config = self.config;

        tokio::spawn(async move {
            info!(
                sweep_interval_secs = config.sweep_interval.as_secs(),
                retain_secs = config.retain_for.as_secs(),
                "Task retention sweeper started"
            );

            let mut interval = tokio::time::interval(config.sweep_interval);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let cutoff = Utc::now()
                            - chrono::Duration::seconds(config.retain_for.as_secs() as i64);
                        let evicted = tasks.evict_finished_before(cutoff);
                        if evicted > 0 {
                            info!(evicted, "Evicted finished command tasks");
                        } else {
                            debug!("No finished command tasks to evict");
                        }
                    }
                    _ = shutdown.notified().wait() => {
                        info!("Task retention sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::{create_task_store, CommandAction};
    use crate::domain::{ChargePointSelect, OcppTransport};

    fn target() -> ChargePointSelect {
        ChargePointSelect {
            transport: OcppTransport::Json,
            charge_point_id: "CP001".into(),
            endpoint_address: None,
        }
    }

    fn zero_retention() -> RetentionConfig {
        RetentionConfig {
            sweep_interval: Duration::from_secs(1),
            retain_for: Duration::ZERO,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn finished_tasks_are_evicted_by_the_sweep() {
        let tasks = create_task_store();
        let id = tasks.create(CommandAction::RemoteStartTransaction, vec![target()]);
        tasks.record_response(id, "CP001", "Accepted");

        let sweeper = TaskRetention::new(tasks.clone(), zero_retention());
        let shutdown = ShutdownSignal::new();
        let handle = sweeper.start(shutdown.clone());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(tasks.is_empty());

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn unfinished_tasks_survive_every_sweep() {
        let tasks = create_task_store();
        let id = tasks.create(CommandAction::RemoteStartTransaction, vec![target()]);

        let sweeper = TaskRetention::new(tasks.clone(), zero_retention());
        let shutdown = ShutdownSignal::new();
        let handle = sweeper.start(shutdown.clone());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(tasks.snapshot(id).is_some());

        shutdown.trigger();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn the_sweeper_stops_on_shutdown() {
        let tasks = create_task_store();
        let sweeper = TaskRetention::new(tasks, zero_retention());
        let shutdown = ShutdownSignal::new();
        let handle = sweeper.start(shutdown.clone());

        shutdown.trigger();
        handle.await.unwrap();
    }
}
