//! Communication tasks
//!
//! One task per caller-initiated dispatch. The task records which devices
//! were addressed and what each one answered; confirmation polling reads
//! it until every target has answered.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::CommandAction;
use crate::domain::ChargePointSelect;

/// Answer recorded for one device.
#[derive(Debug, Clone)]
pub struct RequestResult {
    /// Acknowledgement payload, as the device sent it.
    pub response: Option<String>,
    /// Delivery or device error, when the exchange failed.
    pub error_message: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl RequestResult {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            error_message: None,
            completed_at: Utc::now(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            response: None,
            error_message: Some(message.into()),
            completed_at: Utc::now(),
        }
    }
}

/// State of one dispatched command.
#[derive(Debug, Clone)]
pub struct CommunicationTask {
    pub task_id: i32,
    pub action: CommandAction,
    /// Devices this command was addressed to.
    pub targets: Vec<ChargePointSelect>,
    /// Answers keyed by charge point id.
    pub results: HashMap<String, RequestResult>,
    /// Number of answers that were errors.
    pub error_count: u32,
    pub started_at: DateTime<Utc>,
}

impl CommunicationTask {
    pub fn new(task_id: i32, action: CommandAction, targets: Vec<ChargePointSelect>) -> Self {
        Self {
            task_id,
            action,
            targets,
            results: HashMap::new(),
            error_count: 0,
            started_at: Utc::now(),
        }
    }

    /// A task is finished once every addressed device has answered.
    ///
    /// Derived from the result map, so a snapshot can never show a
    /// finished task without the results that finished it.
    pub fn finished(&self) -> bool {
        self.results.len() >= self.targets.len()
    }

    pub fn result_for(&self, charge_point_id: &str) -> Option<&RequestResult> {
        self.results.get(charge_point_id)
    }

    fn is_target(&self, charge_point_id: &str) -> bool {
        self.targets
            .iter()
            .any(|t| t.charge_point_id == charge_point_id)
    }

    /// Record a device acknowledgement. Answers from devices the task
    /// never addressed are dropped; returns whether the answer was taken.
    pub(crate) fn add_response(&mut self, charge_point_id: &str, response: String) -> bool {
        if !self.is_target(charge_point_id) {
            return false;
        }
        self.results
            .insert(charge_point_id.to_string(), RequestResult::success(response));
        true
    }

    /// Record a failed exchange with one device.
    pub(crate) fn add_error(&mut self, charge_point_id: &str, message: String) -> bool {
        if !self.is_target(charge_point_id) {
            return false;
        }
        self.results
            .insert(charge_point_id.to_string(), RequestResult::failure(message));
        self.error_count += 1;
        true
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OcppTransport;

    fn target(id: &str) -> ChargePointSelect {
        ChargePointSelect {
            transport: OcppTransport::Json,
            charge_point_id: id.into(),
            endpoint_address: None,
        }
    }

    fn sample_task() -> CommunicationTask {
        CommunicationTask::new(1, CommandAction::RemoteStartTransaction, vec![target("CP001")])
    }

    #[test]
    fn new_task_is_unfinished() {
        let task = sample_task();
        assert!(!task.finished());
        assert_eq!(task.error_count, 0);
        assert!(task.result_for("CP001").is_none());
    }

    #[test]
    fn finished_after_single_target_answers() {
        let mut task = sample_task();
        assert!(task.add_response("CP001", "Accepted".into()));
        assert!(task.finished());
        assert_eq!(task.error_count, 0);
        let result = task.result_for("CP001").unwrap();
        assert_eq!(result.response.as_deref(), Some("Accepted"));
        assert!(result.error_message.is_none());
    }

    #[test]
    fn error_answer_counts_and_finishes() {
        let mut task = sample_task();
        assert!(task.add_error("CP001", "connection refused".into()));
        assert!(task.finished());
        assert_eq!(task.error_count, 1);
        let result = task.result_for("CP001").unwrap();
        assert!(result.response.is_none());
        assert_eq!(result.error_message.as_deref(), Some("connection refused"));
    }

    #[test]
    fn answer_from_unaddressed_device_is_dropped() {
        let mut task = sample_task();
        assert!(!task.add_response("CP999", "Accepted".into()));
        assert!(!task.add_error("CP999", "boom".into()));
        assert!(!task.finished());
        assert_eq!(task.error_count, 0);
    }

    #[test]
    fn multi_target_task_needs_every_answer() {
        let mut task = CommunicationTask::new(
            2,
            CommandAction::RemoteStopTransaction,
            vec![target("CP001"), target("CP002")],
        );
        task.add_response("CP001", "Accepted".into());
        assert!(!task.finished());
        task.add_error("CP002", "unreachable".into());
        assert!(task.finished());
        assert_eq!(task.error_count, 1);
    }
}
